/// The active selection: a half-open byte range `[start, end)`.
///
/// A dot is a plain pair of offsets. It never borrows the document and must
/// be translated by the mutation core whenever an edit lands at or before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dot {
    pub start: usize,
    pub end: usize,
}

impl Dot {
    /// Normalizing constructor: endpoints are swapped if given out of order.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn point(p: usize) -> Self {
        Self { start: p, end: p }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, off: usize) -> bool {
        self.start <= off && off < self.end
    }

    /// Both endpoints clamped to `len`.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }

    pub fn translate_insert(self, pos: usize, len: usize) -> Self {
        let shift = |p: usize| if p >= pos { p + len } else { p };
        Self {
            start: shift(self.start),
            end: shift(self.end),
        }
    }

    pub fn translate_delete(self, start: usize, end: usize) -> Self {
        let shift = |p: usize| {
            if p >= end {
                p - (end - start)
            } else if p >= start {
                start
            } else {
                p
            }
        };
        Self {
            start: shift(self.start),
            end: shift(self.end),
        }
    }
}
