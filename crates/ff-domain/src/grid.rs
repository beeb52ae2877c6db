use ff_core::Real;

/// Regular axis-aligned grid: `cells[i]` cells of size `ds` from `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBox {
    pub origin: [Real; 3],
    pub cells: [usize; 3],
    pub ds: Real,
}

impl GridBox {
    pub fn extent(&self) -> [Real; 3] {
        self.cells.map(|n| n as Real * self.ds)
    }

    /// Grid point counts (cells + 1) per axis.
    pub fn points(&self) -> [usize; 3] {
        self.cells.map(|n| n + 1)
    }

    pub fn end(&self) -> [Real; 3] {
        let e = self.extent();
        [
            self.origin[0] + e[0],
            self.origin[1] + e[1],
            self.origin[2] + e[2],
        ]
    }

    pub fn center(&self) -> [Real; 3] {
        let e = self.extent();
        [
            self.origin[0] + 0.5 * e[0],
            self.origin[1] + 0.5 * e[1],
            self.origin[2] + 0.5 * e[2],
        ]
    }

    /// True when `other` lies entirely inside this box.
    pub fn encloses(&self, other: &GridBox) -> bool {
        let (a0, a1) = (self.origin, self.end());
        let (b0, b1) = (other.origin, other.end());
        (0..3).all(|i| b0[i] >= a0[i] - 1e-9 && b1[i] <= a1[i] + 1e-9)
    }
}
