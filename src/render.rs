use crate::Position;
use crate::automaton::Automaton;
use crate::input::Viewport;

/// Anything that can show a grid snapshot.
pub trait Renderer {
    /// Blank the whole surface
    fn clear(&mut self);

    /// Show the live cell at `(x, y)`
    fn draw_cell(&mut self, x: usize, y: usize);

    /// Show a stamp preview over `(x, y)`, whatever is there
    fn draw_preview(&mut self, x: usize, y: usize);
}

/// Draw `automaton` and an optional stamp preview onto `renderer`.
pub fn render<R>(automaton: &Automaton, preview: &[Position], renderer: &mut R)
where
    R: Renderer + ?Sized,
{
    renderer.clear();

    for (x, y, alive) in automaton.cells() {
        if alive {
            renderer.draw_cell(x, y);
        }
    }

    for &(x, y) in preview {
        renderer.draw_preview(x, y);
    }
}

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// A terminal surface where each character holds a 2x4 block of braille dots. Grid cells are
/// scaled onto dots through a [`Viewport`].
pub struct Canvas {
    /// The dot buffer
    db: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the dot buffer
    w: usize,

    /// Height of the dot buffer
    h: usize,

    viewport: Viewport,
}

impl Canvas {
    /// A canvas covering `cols x rows` terminal characters, with `axis_size` cells along the
    /// longer side.
    pub fn new(cols: u16, rows: u16, axis_size: u32) -> Self {
        let (cols, rows) = (cols.max(1) as usize, rows.max(1) as usize);
        let (w, h) = (cols * 2, rows * 4);

        // Each braille character is 3 bytes in UTF-8, plus one newline per row
        let fb = String::with_capacity(3 * cols * rows + rows);

        Self {
            db: vec![false; w * h],
            fb,
            cp: vec![BRAILLE_EMPTY; cols * rows],
            w,
            h,
            viewport: Viewport::fit(w as u32, h as u32, axis_size),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Size of the dot buffer
    pub fn dots(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    /// Turns the dots of cell `(x, y)` on, or flips them when `toggle` is set.
    fn fill_cell(&mut self, x: usize, y: usize, toggle: bool) {
        let (x0, x1) = self.viewport.span(x);
        let (y0, y1) = self.viewport.span(y);

        for dy in y0..y1.min(self.h) {
            for dx in x0..x1.min(self.w) {
                let i = self.xy_from(dx, dy);
                self.db[i] = if toggle { !self.db[i] } else { true };
            }
        }
    }

    /// Fundamentally, we have a buffer of every dot on our screen, and we ask ourselves "Is this
    /// dot on or off?"
    pub fn render(&mut self) -> &str {
        let bw = self.w / 2;

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &on) in self.db.iter().enumerate() {
            if on {
                let (x, y) = (n % self.w, n / self.w);
                self.cp[(y / 4) * bw + (x / 2)] += Self::get_hex_value(x, y);
            }
        }

        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }
        self.fb.push('\n');

        &self.fb
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

impl Renderer for Canvas {
    fn clear(&mut self) {
        self.db.fill(false);
    }

    fn draw_cell(&mut self, x: usize, y: usize) {
        self.fill_cell(x, y, false);
    }

    fn draw_preview(&mut self, x: usize, y: usize) {
        self.fill_cell(x, y, true);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn braille(codepoints: &[u32]) -> String {
        codepoints
            .iter()
            .map(|&c| char::from_u32(c).unwrap())
            .collect()
    }

    #[test]
    fn blinker_one_cell_per_dot() {
        let mut a = Automaton::build(4, 4).unwrap();
        for x in 0..3 {
            a.set_alive(x, 1);
        }

        let mut canvas = Canvas::new(2, 1, 4);
        render(&a, &[], &mut canvas);

        assert_eq!(canvas.render(), braille(&[0x2812, 0x2802]) + "\n");
    }

    #[test]
    fn preview_flips_dots() {
        let mut a = Automaton::build(4, 4).unwrap();
        a.set_alive(0, 0);

        let mut canvas = Canvas::new(2, 1, 4);
        render(&a, &[(0, 0), (2, 0)], &mut canvas);

        assert_eq!(canvas.render(), braille(&[0x2800, 0x2801]) + "\n");
    }

    #[test]
    fn large_cells_cover_blocks() {
        let mut a = Automaton::build(2, 2).unwrap();
        a.set_alive(1, 1);

        // 4x4 dots, 2 cells per side: each cell is a 2x2 block
        let mut canvas = Canvas::new(2, 1, 2);
        assert_eq!((canvas.viewport().columns, canvas.viewport().rows), (2, 2));

        render(&a, &[], &mut canvas);

        assert_eq!(canvas.render(), braille(&[0x2800, 0x28E4]) + "\n");
    }

    #[test]
    fn rows_are_separated() {
        let a = Automaton::build(2, 8).unwrap();
        let mut canvas = Canvas::new(1, 2, 8);

        render(&a, &[], &mut canvas);

        assert_eq!(canvas.render(), braille(&[0x2800]) + "\n" + &braille(&[0x2800]) + "\n");
    }
}
