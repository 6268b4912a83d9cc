/*!
   Module `service` provides the canonical implementation of the [MapService] port.
*/

use citymap_core::{FileType, MapError, MapRenderer, SessionState};

use anyhow::anyhow;
use tokio::task::spawn_blocking;
use tracing::{Level, event};

use super::{
    models::{
        DownloadMapError, DownloadMapRequest, GenerateMapError, GenerateMapRequest, GeneratedMap,
        MapDownload, SessionId,
    },
    ports::{MapService, SessionRepository},
};

/// Canonical implementation of the [MapService] port, through which the map domain API is
/// consumed.
#[derive(Debug, Clone)]
pub struct Service<R, M>
where
    R: SessionRepository,
    M: MapRenderer + Clone + Send + Sync + 'static,
{
    repository: R,
    renderer: M,
}

impl<R, M> Service<R, M>
where
    R: SessionRepository,
    M: MapRenderer + Clone + Send + Sync + 'static,
{
    pub fn new(repository: R, renderer: M) -> Self {
        Self {
            repository,
            renderer,
        }
    }
}

impl<R, M> Service<R, M>
where
    R: SessionRepository,
    M: MapRenderer + Clone + Send + Sync + 'static,
{
    /// Runs `encode` against the session's state on the blocking pool.
    async fn encode<F>(&self, id: SessionId, encode: F) -> Result<Vec<u8>, DownloadMapError>
    where
        F: FnOnce(&SessionState) -> Result<Vec<u8>, MapError> + Send + 'static,
    {
        let session = self
            .repository
            .load_session(id)
            .await
            .ok_or(DownloadMapError::UnknownSession(id))?
            .into_state();

        spawn_blocking(move || encode(&session))
            .await
            .map_err(|err| anyhow!("map export task failed: {err}"))?
            .map_err(|err| match err {
                MapError::NoFigure => DownloadMapError::NoMap(id),
                MapError::Export(err) => DownloadMapError::Export(err),
                other => DownloadMapError::Unknown(other.into()),
            })
    }
}

impl<R, M> MapService for Service<R, M>
where
    R: SessionRepository,
    M: MapRenderer + Clone + Send + Sync + 'static,
{
    /// Merge the submission into its session, render, and store the session.
    ///
    /// Rendering runs on the blocking pool. Committed form values are stored even when
    /// rendering fails, matching a form that keeps what the user typed. The store only
    /// succeeds if no other request stored the session while this one was rendering.
    async fn generate_map(
        &self,
        req: &GenerateMapRequest,
    ) -> Result<GeneratedMap, GenerateMapError> {
        let (id, mut session, version) = match req.session_id() {
            Some(id) => {
                let stored = self
                    .repository
                    .load_session(id)
                    .await
                    .ok_or(GenerateMapError::UnknownSession(id))?;
                let version = stored.version();
                (id, stored.into_state(), Some(version))
            }
            None => (SessionId::new(), SessionState::new(), None),
        };

        let submitted = req.apply_to(session.form());
        let renderer = self.renderer.clone();

        let (session, result) = spawn_blocking(move || {
            let result = session.generate(&renderer, submitted).map(|_| ());
            (session, result)
        })
        .await
        .map_err(|err| anyhow!("map rendering task failed: {err}"))?;

        if version.is_some() || result.is_ok() {
            self.repository
                .store_session(id, session.clone(), version)
                .await
                .inspect_err(|err| event!(Level::WARN, "{}", err))?;
        }

        match result {
            Ok(()) => {
                event!(Level::INFO, "Generated map for session {}", id);
                Ok(GeneratedMap::new(id, session.form().clone()))
            }
            Err(err) => {
                event!(Level::WARN, "Map generation failed for session {}: {}", id, err);
                Err(err.into())
            }
        }
    }

    /// Encode the session's last map on the blocking pool.
    async fn download_map(&self, req: &DownloadMapRequest) -> Result<MapDownload, DownloadMapError> {
        let options = *req.options();
        let data = self
            .encode(req.session_id(), move |session| session.download(&options))
            .await?;

        Ok(MapDownload::new(options.file_type, data))
    }

    async fn preview_map(&self, id: SessionId) -> Result<MapDownload, DownloadMapError> {
        let data = self.encode(id, SessionState::preview).await?;

        Ok(MapDownload::new(FileType::Png, data))
    }
}
