use crate::consts::{BlockPointer, NEXT_POINTER_SIZE};
use crate::util::serializable::{read_u32, ByteSerializable};

/// A data block: payload plus the index of the next block in its chain.
#[derive(Debug, PartialEq, Clone)]
pub struct Block {
    pub data: Vec<u8>,
    pub next: BlockPointer,
}

impl Block {
    pub fn zeroed(block_size: usize, next: BlockPointer) -> Block {
        Block { data: vec![0; block_size], next }
    }
}

impl ByteSerializable for Block {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() + NEXT_POINTER_SIZE);
        bytes.extend_from_slice(&self.data);
        bytes.extend_from_slice(&self.next.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let (data, next) = bytes.split_at(bytes.len() - NEXT_POINTER_SIZE);
        Block { data: data.to_vec(), next: read_u32(next, 0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_bytes() {
        let block = Block { data: vec![1, 2, 3, 4], next: 258 };
        let bytes = block.to_bytes();
        assert_eq!(bytes, vec![1, 2, 3, 4, 2, 1, 0, 0]);
        assert_eq!(Block::from_bytes(&bytes), block);
    }
}
