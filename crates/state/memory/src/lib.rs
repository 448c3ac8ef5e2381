mod store;

pub use store::MemoryCounterStore;
