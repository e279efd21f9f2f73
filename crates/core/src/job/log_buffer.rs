//! Bounded capture of the transcoder's output.

/// Keeps the most recent `capacity` bytes of tool output.
#[derive(Debug, Clone)]
pub struct RollingLog {
    buf: String,
    capacity: usize,
}

impl RollingLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: String::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
        if self.buf.len() > self.capacity {
            let mut cut = self.buf.len() - self.capacity;
            while !self.buf.is_char_boundary(cut) {
                cut += 1;
            }
            self.buf.drain(..cut);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Last `n` non-blank lines. ffmpeg separates stats with `\r`, so both
    /// line endings count.
    pub fn tail_lines(&self, n: usize) -> String {
        let lines: Vec<&str> = self
            .buf
            .split(['\r', '\n'])
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect();
        lines[lines.len().saturating_sub(n)..].join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_recent_bytes() {
        let mut log = RollingLog::new(8);
        log.push("abcdef");
        log.push("ghijkl");
        assert_eq!(log.as_str(), "efghijkl");
        assert_eq!(log.len(), 8);
    }

    #[test]
    fn test_cut_respects_char_boundaries() {
        let mut log = RollingLog::new(4);
        log.push("aé€b");
        assert!(log.len() <= 4);
        assert!(log.as_str().ends_with('b'));
    }

    #[test]
    fn test_tail_lines() {
        let mut log = RollingLog::new(1024);
        log.push("line one\nframe=1 time=00:00:01.00\rframe=2 time=00:00:02.00\r\n\n");
        log.push("clip.mkv: Invalid data found when processing input\n");
        assert_eq!(
            log.tail_lines(2),
            "frame=2 time=00:00:02.00\nclip.mkv: Invalid data found when processing input"
        );
        assert_eq!(log.tail_lines(10).lines().count(), 4);
    }

    #[test]
    fn test_empty_tail() {
        let log = RollingLog::new(16);
        assert!(log.is_empty());
        assert_eq!(log.tail_lines(3), "");
    }
}
