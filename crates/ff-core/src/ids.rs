use core::fmt;

/// Turbine identifier as given in the sweep file.
///
/// Any `u32` is valid; ordering follows the integer value so that iteration
/// over a layout is stable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurbineId(u32);

impl TurbineId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Suffix used for per-turbine file names, e.g. `T3`.
    pub fn file_tag(self) -> String {
        format!("T{}", self.0)
    }
}

impl fmt::Debug for TurbineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TurbineId({})", self.0)
    }
}

impl fmt::Display for TurbineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TurbineId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_raw_value() {
        let mut ids = vec![TurbineId::new(11), TurbineId::new(0), TurbineId::new(3)];
        ids.sort();
        assert_eq!(ids, vec![TurbineId::new(0), TurbineId::new(3), TurbineId::new(11)]);
    }

    #[test]
    fn file_tag_and_display() {
        let id = TurbineId::from(7);
        assert_eq!(id.file_tag(), "T7");
        assert_eq!(id.to_string(), "7");
        assert_eq!(format!("{id:?}"), "TurbineId(7)");
    }
}
