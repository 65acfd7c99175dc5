mod repository;

pub use repository::TopicStore;
