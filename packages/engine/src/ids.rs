use crc32fast::Hasher;

/// Generate a canvas seed from a canvas name using CRC32
pub fn canvas_seed(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("canvas://") {
        buff = format!("canvas://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for nodes, frames and contexts within one canvas
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Canvas seed (CRC32)
    count: u32,   // Sequential counter
}

impl IdGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            seed: canvas_seed(name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get canvas seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}
