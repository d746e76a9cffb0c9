/// Line writer with two-space Ruby indentation
#[derive(Debug, Default)]
pub(super) struct RubyWriter {
    out: String,
    depth: usize,
}

impl RubyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Write a line exactly as given, for hand-aligned continuation lines
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    /// Write `header`, run `body` one level deeper, then close with `end`
    pub fn block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.line(header);
        self.indented(body);
        self.line("end");
    }

    pub fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    /// Current indentation in columns, for aligning continuation lines
    pub fn column(&self) -> usize {
        self.depth * 2
    }

    pub fn finish(self) -> String {
        self.out
    }
}
