use std::sync::Arc;

use crate::database::DataStore;
use crate::post::post_model::Post;
use crate::utils::error::CustomError;

pub struct PostService {
    store: Arc<DataStore>,
}

impl PostService {
    pub fn new(store: Arc<DataStore>) -> Self {
        PostService { store }
    }

    pub fn create_post(
        &self,
        title: &str,
        content: &str,
        author_id: u64,
        comments_open: bool,
    ) -> Result<Post, CustomError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CustomError::ValidationError(
                "missing required parameter `title`".into(),
            ));
        }

        Ok(self
            .store
            .insert_post(title, content, author_id, comments_open))
    }

    pub fn get_post(&self, id: u64) -> Option<Post> {
        self.store.find_post(id)
    }

    pub fn delete_post(&self, id: u64) -> bool {
        self.store.delete_post(id)
    }
}
