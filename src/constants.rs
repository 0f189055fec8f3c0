pub const DEFAULT_MAX_DEPTH: usize = 512;
pub const DEFAULT_MAX_PREALLOC: usize = 1024;
