//! Text chunking for ingestion.

/// Splits a document into pieces small enough to embed and retrieve.
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Packs blank-line separated paragraphs into chunks of at most `chunk_size`
/// characters, carrying trailing paragraphs forward as overlap.
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    chunk_size: usize,
    overlap: usize,
}

const PARAGRAPH_SEPARATOR: &str = "\n\n";

impl ParagraphChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Fixed windows over a paragraph that does not fit in one chunk.
    fn split_long(&self, paragraph: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = paragraph.chars().collect();
        let step = self.chunk_size - self.overlap;
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(chars.len());
            out.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
    }

    /// Trailing paragraphs of a finished chunk that fit within the overlap.
    fn carry_over<'a>(&self, paragraphs: &[&'a str]) -> Vec<&'a str> {
        let mut carried = Vec::new();
        let mut total = 0;
        for paragraph in paragraphs.iter().rev() {
            let extra = char_len(paragraph) + if carried.is_empty() { 0 } else { 2 };
            if total + extra > self.overlap {
                break;
            }
            total += extra;
            carried.push(*paragraph);
        }
        carried.reverse();
        carried
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn joined_len(paragraphs: &[&str]) -> usize {
    let text: usize = paragraphs.iter().map(|p| char_len(p)).sum();
    text + paragraphs.len().saturating_sub(1) * PARAGRAPH_SEPARATOR.len()
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for paragraph in text
            .split(PARAGRAPH_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            if char_len(paragraph) > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(current.join(PARAGRAPH_SEPARATOR));
                    current.clear();
                }
                self.split_long(paragraph, &mut chunks);
                continue;
            }

            let with_paragraph = joined_len(&current) + PARAGRAPH_SEPARATOR.len() + char_len(paragraph);
            if !current.is_empty() && with_paragraph > self.chunk_size {
                chunks.push(current.join(PARAGRAPH_SEPARATOR));
                current = self.carry_over(&current);
                if joined_len(&current) + PARAGRAPH_SEPARATOR.len() + char_len(paragraph)
                    > self.chunk_size
                {
                    current.clear();
                }
            }
            current.push(paragraph);
        }

        if !current.is_empty() {
            chunks.push(current.join(PARAGRAPH_SEPARATOR));
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        let chunker = ParagraphChunker::default();
        let chunks = chunker.chunk("  Restart the print spooler.\n\nThen retry.  ");
        assert_eq!(chunks, vec!["Restart the print spooler.\n\nThen retry."]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(ParagraphChunker::default().chunk("   \n\n ").is_empty());
    }

    #[test]
    fn packs_paragraphs_with_overlap() {
        let chunker = ParagraphChunker::new(30, 10);
        let text = "alpha one\n\nbeta two\n\ngamma three\n\ndelta four";
        let chunks = chunker.chunk(text);
        assert_eq!(
            chunks,
            vec![
                "alpha one\n\nbeta two",
                "beta two\n\ngamma three",
                "delta four",
            ]
        );
        assert!(chunks.iter().all(|c| c.chars().count() <= 30));
    }

    #[test]
    fn long_paragraph_split_into_windows() {
        let chunker = ParagraphChunker::new(10, 2);
        let chunks = chunker.chunk("abcdefghijklmnopqrstuvwxy");
        assert_eq!(chunks, vec!["abcdefghij", "ijklmnopqr", "qrstuvwxy"]);
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let chunker = ParagraphChunker::new(4, 1);
        let chunks = chunker.chunk("ééééééé");
        assert_eq!(chunks, vec!["éééé", "éééé"]);
    }

    #[test]
    fn overlap_clamped_below_chunk_size() {
        let chunker = ParagraphChunker::new(5, 50);
        let chunks = chunker.chunk("abcdefgh");
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], "abcde");
    }
}
