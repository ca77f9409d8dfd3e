/// Celestial body registry for the close-approach visualizer.
///
/// Defines the canonical set of target bodies the CAD API accepts, along
/// with the short codes its `body` query parameter expects. This is the
/// single source of truth for body codes — all other modules should go
/// through `Body` rather than hardcoding code strings.

// ---------------------------------------------------------------------------
// Body type
// ---------------------------------------------------------------------------

/// A target body for close-approach queries.
///
/// The enum is closed on purpose: the query builder can only ever be handed
/// one of these nine values, so an undefined body code is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Moon,
}

/// All selectable bodies, in display order (Earth is the conventional
/// default, index 2).
pub static BODY_REGISTRY: &[Body] = &[
    Body::Mercury,
    Body::Venus,
    Body::Earth,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Moon,
];

impl Body {
    /// The short code the CAD API's `body` parameter expects.
    pub fn short_code(&self) -> &'static str {
        match self {
            Body::Mercury => "Merc",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Juptr",
            Body::Saturn => "Satrn",
            Body::Uranus => "Urnus",
            Body::Neptune => "Neptn",
            Body::Moon => "Moon",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Moon => "Moon",
        }
    }

    /// Looks up a body by display name, case-insensitively.
    /// Returns `None` for anything outside the registry.
    pub fn from_name(name: &str) -> Option<Body> {
        BODY_REGISTRY
            .iter()
            .copied()
            .find(|b| b.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Returns the display names of all selectable bodies, suitable for a
/// selector widget or a usage message.
pub fn all_display_names() -> Vec<&'static str> {
    BODY_REGISTRY.iter().map(|b| b.display_name()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
