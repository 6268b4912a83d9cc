use svg::node::element::{Circle, Path, Pattern, path::Data};

// Tile edge for a single-character hatch; repeated characters shrink it.
const BASE_TILE: f32 = 12.0;
const MIN_TILE: f32 = 2.0;
const DOT_RADIUS: f32 = 0.5;
const LINE_WIDTH: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HatchMark {
    Diagonal,
    BackDiagonal,
    Vertical,
    Horizontal,
    Dot,
}

impl HatchMark {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '/' => Some(HatchMark::Diagonal),
            '\\' => Some(HatchMark::BackDiagonal),
            '|' => Some(HatchMark::Vertical),
            '-' => Some(HatchMark::Horizontal),
            '.' | 'o' | 'O' | '*' => Some(HatchMark::Dot),
            _ => None,
        }
    }
}

/// Tile edge for the hatch, denser the more characters it repeats.
pub(super) fn tile_size(hatch: &str) -> f32 {
    let count = hatch.chars().filter(|c| HatchMark::from_char(*c).is_some()).count();
    if count == 0 {
        return BASE_TILE;
    }

    let distinct = distinct_marks(hatch).len().max(1);
    (BASE_TILE * distinct as f32 / count as f32).max(MIN_TILE)
}

fn distinct_marks(hatch: &str) -> Vec<HatchMark> {
    let mut marks = Vec::new();
    for mark in hatch.chars().filter_map(HatchMark::from_char) {
        if !marks.contains(&mark) {
            marks.push(mark);
        }
    }
    marks
}

/// Builds a repeating pattern drawing the hatch marks in `color`. Returns
/// `None` when the pattern has no mark the preview knows how to draw.
pub(super) fn hatch_pattern(id: &str, hatch: &str, color: &str) -> Option<Pattern> {
    let marks = distinct_marks(hatch);
    if marks.is_empty() {
        return None;
    }

    let size = tile_size(hatch);
    let mut pattern = Pattern::new()
        .set("id", id)
        .set("patternUnits", "userSpaceOnUse")
        .set("width", size)
        .set("height", size);

    for mark in marks {
        let data = match mark {
            HatchMark::Diagonal => Data::new()
                .move_to((0.0_f32, size))
                .line_to((size, 0.0_f32)),
            HatchMark::BackDiagonal => Data::new()
                .move_to((0.0_f32, 0.0_f32))
                .line_to((size, size)),
            HatchMark::Vertical => Data::new()
                .move_to((size / 2.0, 0.0_f32))
                .line_to((size / 2.0, size)),
            HatchMark::Horizontal => Data::new()
                .move_to((0.0_f32, size / 2.0))
                .line_to((size, size / 2.0)),
            HatchMark::Dot => {
                pattern = pattern.add(
                    Circle::new()
                        .set("cx", size / 2.0)
                        .set("cy", size / 2.0)
                        .set("r", DOT_RADIUS)
                        .set("fill", color),
                );
                continue;
            }
        };

        pattern = pattern.add(
            Path::new()
                .set("fill", "none")
                .set("stroke", color)
                .set("stroke-width", LINE_WIDTH)
                .set("d", data),
        );
    }

    Some(pattern)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_repeated_marks_shrink_the_tile() {
        assert_eq!(tile_size("/"), 12.0);
        assert_eq!(tile_size("//"), 6.0);
        assert_eq!(tile_size("......"), 2.0);
        assert_eq!(tile_size("/////////"), 2.0);
        assert_eq!(tile_size("/\\"), 12.0);
        assert_eq!(tile_size("?"), 12.0);
    }

    #[test]
    fn test_unknown_hatch_has_no_pattern() {
        assert!(hatch_pattern("hatch-x", "??", "#000000").is_none());
        assert!(hatch_pattern("hatch-x", "", "#000000").is_none());
    }

    #[test]
    fn test_pattern_markup() {
        let dots = hatch_pattern("hatch-waters", "......", "#dfe7ed")
            .unwrap()
            .to_string();

        assert!(dots.contains(r#"id="hatch-waters""#));
        assert!(dots.contains("<circle"));
        assert!(!dots.contains("<path"));

        let lines = hatch_pattern("hatch-green", "/////////", "#d3ebdc")
            .unwrap()
            .to_string();

        assert!(lines.contains("<path"));
        assert!(lines.contains(r##"stroke="#d3ebdc""##));
    }
}
