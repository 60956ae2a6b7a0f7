use ratatui::style::{Color, Style};

/// Braille pattern spinner frames for smooth animation
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Spinner widget for showing loading state
pub struct Spinner {
    /// Current frame index (0 to SPINNER_FRAMES.len() - 1)
    frame: usize,
    /// Style for the spinner character
    style: Style,
}

impl Spinner {
    /// Create a spinner with a specific frame
    pub fn with_frame(frame: usize) -> Self {
        Self {
            frame: frame % SPINNER_FRAMES.len(),
            style: Style::default().fg(Color::Yellow),
        }
    }

    /// Set the style for the spinner character
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn current_style(&self) -> Style {
        self.style
    }

    /// Get the current spinner character
    pub fn current_char(&self) -> char {
        SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()]
    }

    /// Get the next frame index
    pub fn next_frame(frame: usize) -> usize {
        (frame + 1) % SPINNER_FRAMES.len()
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::with_frame(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_frames() {
        assert_eq!(SPINNER_FRAMES.len(), 10);
    }

    #[test]
    fn test_spinner_with_frame() {
        let spinner = Spinner::with_frame(5);
        assert_eq!(spinner.current_char(), SPINNER_FRAMES[5]);
    }

    #[test]
    fn test_spinner_frame_wrapping() {
        let spinner = Spinner::with_frame(15); // Greater than SPINNER_FRAMES.len()
        assert_eq!(spinner.current_char(), SPINNER_FRAMES[5]);
    }

    #[test]
    fn test_next_frame() {
        assert_eq!(Spinner::next_frame(0), 1);
        assert_eq!(Spinner::next_frame(9), 0); // Wraps around
        assert_eq!(Spinner::next_frame(5), 6);
    }
}
