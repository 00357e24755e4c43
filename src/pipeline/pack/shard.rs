use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::logic::Block;

pub struct ShardMeta {
    pub shard_index: i32,
    pub path: String,
    pub blocks: i32,
    pub tokens: i64,
    // serialized JSONL, kept so the DB row can hash it
    pub content: String,
}

/// Accumulates packed blocks and writes them out as JSONL shard files of
/// at most blocks_per_shard blocks each.
pub struct ShardWriter {
    dir: PathBuf,
    next_index: i32,
    blocks_per_shard: usize,
    pending: Vec<Block>,
}

impl ShardWriter {
    pub fn new(dir: impl AsRef<Path>, start_index: i32, blocks_per_shard: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            next_index: start_index,
            blocks_per_shard: blocks_per_shard.max(1),
            pending: Vec::new(),
        }
    }

    /// Buffer blocks; every time a full shard accumulates, write it out.
    pub fn push_blocks(&mut self, blocks: Vec<Block>) -> Result<Vec<ShardMeta>> {
        self.pending.extend(blocks);
        let mut written = Vec::new();
        while self.pending.len() >= self.blocks_per_shard {
            let rest = self.pending.split_off(self.blocks_per_shard);
            let full = std::mem::replace(&mut self.pending, rest);
            written.push(self.write_shard(&full)?);
        }
        Ok(written)
    }

    /// Flush the trailing partial shard, if any.
    pub fn finish(mut self) -> Result<Option<ShardMeta>> {
        if self.pending.is_empty() { return Ok(None); }
        let blocks = std::mem::take(&mut self.pending);
        Ok(Some(self.write_shard(&blocks)?))
    }

    fn write_shard(&mut self, blocks: &[Block]) -> Result<ShardMeta> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create shard dir {}", self.dir.display()))?;

        let index = self.next_index;
        self.next_index += 1;

        let path = self.dir.join(format!("shard-{:05}.jsonl", index));
        let mut content = String::new();
        let mut tokens = 0i64;
        for b in blocks {
            content.push_str(&serde_json::to_string(b)?);
            content.push('\n');
            tokens += b.input_ids.len() as i64;
        }
        fs::write(&path, &content)
            .with_context(|| format!("write shard {}", path.display()))?;

        Ok(ShardMeta {
            shard_index: index,
            path: path.to_string_lossy().into_owned(),
            blocks: blocks.len() as i32,
            tokens,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(len: usize, fill: u32) -> Block {
        Block { input_ids: vec![fill; len], attention_mask: vec![1; len], labels: vec![fill; len] }
    }

    #[test]
    fn writes_full_shards_and_flushes_tail() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ShardWriter::new(dir.path(), 0, 2);

        let written = w.push_blocks(vec![block(4, 1), block(4, 2), block(4, 3)]).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].shard_index, 0);
        assert_eq!(written[0].blocks, 2);
        assert_eq!(written[0].tokens, 8);

        let tail = w.finish().unwrap().expect("partial shard");
        assert_eq!(tail.shard_index, 1);
        assert_eq!(tail.blocks, 1);

        let text = std::fs::read_to_string(&tail.path).unwrap();
        let line: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(line["input_ids"], serde_json::json!([3, 3, 3, 3]));
        assert_eq!(line["labels"], line["input_ids"]);
    }

    #[test]
    fn empty_writer_flushes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let w = ShardWriter::new(dir.path(), 0, 8);
        assert!(w.finish().unwrap().is_none());
    }
}
