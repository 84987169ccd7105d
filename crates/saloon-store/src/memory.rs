use async_trait::async_trait;
use parking_lot::RwLock;

use saloon_core::traits::ContentStore;
use saloon_core::types::{ContentSnapshot, Reply, Topic};
use saloon_core::Result;

/// Content store backed by a plain snapshot behind a lock.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    content: RwLock<ContentSnapshot>,
}

impl MemoryContentStore {
    pub fn new(content: ContentSnapshot) -> Self {
        Self { content: RwLock::new(content) }
    }

    pub fn add_topic(&self, id: &str, title: &str, content: &str) {
        self.content.write().topics.push(Topic { id: id.into(), title: title.into(), content: content.into() });
    }

    pub fn add_reply(&self, id: &str, topic_id: &str, content: &str) {
        self.content.write().replies.push(Reply { id: id.into(), topic_id: topic_id.into(), content: content.into() });
    }

    /// Drop a topic together with its replies.
    pub fn remove_topic(&self, id: &str) {
        let mut content = self.content.write();
        content.topics.retain(|t| t.id != id);
        content.replies.retain(|r| r.topic_id != id);
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn snapshot(&self) -> Result<ContentSnapshot> {
        Ok(self.content.read().clone())
    }
}
