use std::{
    fmt::{Display, Formatter},
    sync::LazyLock,
};

use indexmap::IndexMap;
use serde::Serialize;

#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "scheme-ord-hash", derive(PartialOrd, Ord, Hash))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub enum ColorScheme {
    #[default]
    Greyscale,
    Colour,
}

impl ColorScheme {
    /// Anything other than an exact `"Greyscale"` selects [ColorScheme::Colour].
    pub fn from_name(name: &str) -> Self {
        if name == "Greyscale" {
            ColorScheme::Greyscale
        } else {
            ColorScheme::Colour
        }
    }
}

impl Display for ColorScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorScheme::Greyscale => write!(f, "Greyscale"),
            ColorScheme::Colour => write!(f, "Colour"),
        }
    }
}

/// Default edge colors, one per layer name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    #[serde(skip)]
    scheme: ColorScheme,
    #[serde(flatten)]
    colors: IndexMap<&'static str, &'static str>,
}

impl Palette {
    pub fn for_scheme(scheme: ColorScheme) -> &'static Palette {
        match scheme {
            ColorScheme::Greyscale => &GREYSCALE,
            ColorScheme::Colour => &COLOUR,
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn get(&self, layer: &str) -> Option<&'static str> {
        self.colors.get(layer).copied()
    }

    pub fn contains(&self, layer: &str) -> bool {
        self.colors.contains_key(layer)
    }
}

static GREYSCALE: LazyLock<Palette> = LazyLock::new(|| Palette {
    scheme: ColorScheme::Greyscale,
    colors: IndexMap::from([
        ("perimeter", "#ffffff"),
        ("streets", "#969595"),
        ("buildings", "#7F7F7F"),
        ("amenity", "#BFBFBF"),
        ("landuses", "#A9A9A9"),
        ("naturals", "#D3D3D3"),
        ("boundarys", "#b5b5b5"),
        ("railways", "#666666"),
        ("man_made", "#A0A0A0"),
        ("tourism", "#C0C0C0"),
        ("power", "#696969"),
        ("public_transport", "#999999"),
        ("place", "#4F4F4F"),
        ("waters", "#dfe7ed"),
        ("green_spaces", "#d3ebdc"),
    ]),
});

// Keyed by singular category names, unlike the layer catalog. Resolving the
// full catalog against this palette fails with a missing entry.
static COLOUR: LazyLock<Palette> = LazyLock::new(|| Palette {
    scheme: ColorScheme::Colour,
    colors: IndexMap::from([
        ("perimeter", "#2C3E50"),
        ("streets", "#E67E22"),
        ("building", "#95A5A6"),
        ("amenity", "#F1C40F"),
        ("landuse", "#27AE60"),
        ("natural", "#229954"),
        ("boundary", "#3498DB"),
        ("railways", "#9B59B6"),
        ("man_made", "#E74C3C"),
        ("tourism", "#F39C12"),
        ("power", "#C0392B"),
        ("public_transport", "#16A085"),
        ("place", "#D35400"),
        ("water", "#2980B9"),
        ("green_space", "#1ABC9C"),
    ]),
});

/// Looks up the default palette by scheme name.
pub fn get_default_colors(scheme: &str) -> &'static Palette {
    Palette::for_scheme(ColorScheme::from_name(scheme))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layers::get_layers;

    #[test]
    fn test_unknown_scheme_falls_back_to_colour() {
        let colour = get_default_colors("Colour");

        for name in ["colour", "greyscale", "", "Grayscale", "Color", "GREYSCALE"] {
            assert_eq!(get_default_colors(name), colour, "scheme {name:?}");
        }

        assert_ne!(get_default_colors("Greyscale"), colour);
    }

    #[test]
    fn test_greyscale_covers_every_layer() {
        let palette = get_default_colors("Greyscale");

        for layer in get_layers().names() {
            assert!(palette.contains(layer), "missing greyscale entry: {layer}");
        }

        assert_eq!(palette.get("buildings"), Some("#7F7F7F"));
        assert_eq!(palette.get("waters"), Some("#dfe7ed"));
        assert_eq!(palette.get("green_spaces"), Some("#d3ebdc"));
    }

    #[test]
    fn test_colour_uses_singular_keys() {
        let palette = get_default_colors("Colour");

        let missing = get_layers()
            .names()
            .filter(|layer| !palette.contains(layer))
            .collect::<Vec<_>>();

        assert_eq!(
            missing,
            vec![
                "buildings",
                "landuses",
                "naturals",
                "boundarys",
                "waters",
                "green_spaces",
            ]
        );
        assert_eq!(palette.get("building"), Some("#95A5A6"));
        assert_eq!(palette.get("streets"), Some("#E67E22"));
    }

    #[test]
    fn test_palettes_carry_their_scheme() {
        assert_eq!(
            Palette::for_scheme(ColorScheme::Greyscale).scheme(),
            ColorScheme::Greyscale
        );
        assert_eq!(get_default_colors("anything").scheme(), ColorScheme::Colour);
        assert_eq!(ColorScheme::Colour.to_string(), "Colour");
        assert_eq!(ColorScheme::from_name("Greyscale"), ColorScheme::default());
    }
}
