/*
   Module `ports` specifies the API by which external modules interact with the map domain.

   All traits are bounded by `Send + Sync + 'static`, since their implementations must be shareable
   between request-handling threads.

   Trait methods are explicitly asynchronous, including `Send` bounds on response types,
   since the application is expected to always run in a multithreaded environment.
*/

use std::future::Future;

use citymap_core::SessionState;

use crate::domain::models::*;

/// `MapService` is the public API for the map domain.
///
/// External modules must conform to this contract – the domain is not concerned with the
/// implementation details or underlying technology of any external code.
pub trait MapService: Clone + Send + Sync + 'static {
    /// Asynchronously commit the submitted form values to a session and render its map.
    ///
    /// # Errors
    ///
    /// - [GenerateMapError::UnknownSession] if the request names a session that does not exist.
    /// - [GenerateMapError::InvalidRequest] if the merged form values are invalid.
    /// - [GenerateMapError::Style] if a layer has no color under the chosen scheme.
    /// - [GenerateMapError::Render] if the renderer fails.
    fn generate_map(
        &self,
        req: &GenerateMapRequest,
    ) -> impl Future<Output = Result<GeneratedMap, GenerateMapError>> + Send;

    /// Asynchronously encode the last map a session generated.
    ///
    /// # Errors
    ///
    /// - [DownloadMapError::UnknownSession] if the session does not exist.
    /// - [DownloadMapError::NoMap] if the session has not generated a map.
    /// - [DownloadMapError::Export] if encoding fails.
    fn download_map(
        &self,
        req: &DownloadMapRequest,
    ) -> impl Future<Output = Result<MapDownload, DownloadMapError>> + Send;

    /// Asynchronously encode the last map a session generated as a PNG at its own size.
    ///
    /// # Errors
    ///
    /// Same as [MapService::download_map].
    fn preview_map(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<MapDownload, DownloadMapError>> + Send;
}

/// `SessionRepository` represents a store of per-user session state.
///
/// Sessions may expire. An expired session behaves as if it never existed.
///
/// External modules must conform to this contract – the domain is not concerned with the
/// implementation details or underlying technology of any external code.
pub trait SessionRepository: Send + Sync + Clone + 'static {
    /// Asynchronously fetch a session, if it exists.
    fn load_session(&self, id: SessionId) -> impl Future<Output = Option<StoredSession>> + Send;

    /// Asynchronously store a session and return its new version.
    ///
    /// With `expected_version` set, the session is only replaced if it is still at that
    /// version. Without it, the session is only created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// - [StoreSessionError::Stale] if the condition does not hold.
    fn store_session(
        &self,
        id: SessionId,
        session: SessionState,
        expected_version: Option<u64>,
    ) -> impl Future<Output = Result<u64, StoreSessionError>> + Send;
}
