/// Running vertical position on the current page, in millimetres from the
/// top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    y: f32,
    page_height: f32,
    margin: f32,
}

impl PageCursor {
    pub fn new(page_height: f32, margin: f32) -> Self {
        Self {
            y: margin,
            page_height,
            margin,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    /// Back to the top margin of a fresh page.
    pub fn reset(&mut self) {
        self.y = self.margin;
    }

    pub fn fits(&self, space: f32) -> bool {
        self.y + space <= self.page_height - self.margin
    }

    /// Returns true when `space` does not fit and the cursor moved to the top
    /// of a new page. The caller emits the page break.
    pub fn reserve(&mut self, space: f32) -> bool {
        if self.fits(space) {
            return false;
        }
        self.reset();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_within_printable_area() {
        let mut cursor = PageCursor::new(297.0, 20.0);
        cursor.advance(200.0);
        assert!(!cursor.reserve(57.0));
        assert_eq!(cursor.y(), 220.0);
    }

    #[test]
    fn test_reserve_breaks_page_on_overflow() {
        let mut cursor = PageCursor::new(297.0, 20.0);
        cursor.advance(250.0);
        assert!(cursor.reserve(10.0));
        assert_eq!(cursor.y(), 20.0);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let mut cursor = PageCursor::new(100.0, 10.0);
        cursor.advance(70.0);
        assert!(cursor.fits(10.0));
        assert!(!cursor.reserve(10.0));
        assert!(cursor.reserve(10.5));
    }
}
