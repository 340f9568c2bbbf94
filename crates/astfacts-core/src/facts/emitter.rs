//! Fact stream sinks.

use std::io::Write;

use super::Fact;
use crate::error::FactError;

/// Receives facts in traversal order.
pub trait Emitter {
    fn emit(&mut self, fact: Fact) -> Result<(), FactError>;
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    fn emit(&mut self, fact: Fact) -> Result<(), FactError> {
        (**self).emit(fact)
    }
}

/// Collects facts in memory.
impl Emitter for Vec<Fact> {
    fn emit(&mut self, fact: Fact) -> Result<(), FactError> {
        self.push(fact);
        Ok(())
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesEmitter<W: Write> {
    writer: W,
    emitted: usize,
}

impl<W: Write> JsonLinesEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, emitted: 0 }
    }

    /// Number of facts written so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn flush(&mut self) -> Result<(), FactError> {
        self.writer
            .flush()
            .map_err(|e| FactError::Emit(e.to_string()))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Emitter for JsonLinesEmitter<W> {
    fn emit(&mut self, fact: Fact) -> Result<(), FactError> {
        serde_json::to_writer(&mut self.writer, &fact)?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| FactError::Emit(e.to_string()))?;
        self.emitted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Kind;
    use std::collections::BTreeMap;

    fn fact(key: &str) -> Fact {
        Fact {
            common_kind: "project".to_string(),
            kind: Kind::new("project", "php", false),
            key: key.to_string(),
            parent_key: String::new(),
            older_siblings: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn test_writes_one_line_per_fact() {
        let mut emitter = JsonLinesEmitter::new(Vec::new());
        emitter.emit(fact("1")).unwrap();
        emitter.emit(fact("1_1")).unwrap();
        assert_eq!(emitter.emitted(), 2);

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: Fact = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.key, "1_1");
        assert!(out.ends_with('\n'));
    }
}
