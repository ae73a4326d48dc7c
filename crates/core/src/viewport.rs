/// Below this many columns the compact layout is used.
pub const COMPACT_BREAKPOINT: u16 = 80;
/// Assumed width when the terminal does not report one.
pub const FALLBACK_WIDTH: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Compact,
    Regular,
}

impl LayoutMode {
    pub fn for_width(width: u16) -> Self {
        if width < COMPACT_BREAKPOINT {
            LayoutMode::Compact
        } else {
            LayoutMode::Regular
        }
    }
}

/// Queried once per layout pass; renderers never read the environment directly.
pub trait ViewportObserver: Send + Sync {
    fn width(&self) -> u16;

    fn layout(&self) -> LayoutMode {
        LayoutMode::for_width(self.width())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedViewport(pub u16);

impl ViewportObserver for FixedViewport {
    fn width(&self) -> u16 {
        self.0
    }
}

/// Reads `COLUMNS` on every query so a resized shell is picked up.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvViewport;

impl ViewportObserver for EnvViewport {
    fn width(&self) -> u16 {
        parse_columns(std::env::var("COLUMNS").ok().as_deref())
    }
}

fn parse_columns(raw: Option<&str>) -> u16 {
    raw.and_then(|s| s.trim().parse::<u16>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(FALLBACK_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive() {
        assert_eq!(FixedViewport(79).layout(), LayoutMode::Compact);
        assert_eq!(FixedViewport(80).layout(), LayoutMode::Regular);
    }

    #[test]
    fn unparseable_columns_fall_back() {
        assert_eq!(parse_columns(Some("120")), 120);
        assert_eq!(parse_columns(Some(" 60 ")), 60);
        assert_eq!(parse_columns(Some("wide")), FALLBACK_WIDTH);
        assert_eq!(parse_columns(Some("0")), FALLBACK_WIDTH);
        assert_eq!(parse_columns(None), FALLBACK_WIDTH);
    }
}
