#![allow(dead_code)]

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use drive_upload_core::contract::{NewObject, ObjectQuery, ObjectStore, RemoteObject, StoreError};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub id: String,
    pub name: String,
    pub parents: Vec<String>,
    pub content: Vec<u8>,
}

#[derive(Default)]
struct State {
    objects: Vec<StoredObject>,
    next_id: usize,
    list_calls: usize,
    create_calls: usize,
    update_calls: usize,
    download_calls: usize,
}

/// In-memory store keeping objects in insertion order.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str, parent: &str, content: &[u8]) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("obj-{}", state.next_id);
        state.objects.push(StoredObject {
            id: id.clone(),
            name: name.to_string(),
            parents: vec![parent.to_string()],
            content: content.to_vec(),
        });
        id
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.state.lock().unwrap().objects.clone()
    }

    pub fn named(&self, name: &str, parent: &str) -> Vec<StoredObject> {
        self.objects()
            .into_iter()
            .filter(|o| o.name == name && o.parents.iter().any(|p| p == parent))
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }

    pub fn download_calls(&self) -> usize {
        self.state.lock().unwrap().download_calls
    }
}

fn to_remote(o: &StoredObject) -> RemoteObject {
    RemoteObject {
        id: o.id.clone(),
        name: o.name.clone(),
        parents: o.parents.clone(),
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list(&self, query: &ObjectQuery) -> Result<Vec<RemoteObject>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state
            .objects
            .iter()
            .filter(|o| o.name == query.name && o.parents.contains(&query.parent_id))
            .map(to_remote)
            .collect())
    }

    async fn create(&self, object: NewObject) -> Result<RemoteObject, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        state.next_id += 1;
        let stored = StoredObject {
            id: format!("obj-{}", state.next_id),
            name: object.name,
            parents: object.parents,
            content: object.content,
        };
        let remote = to_remote(&stored);
        state.objects.push(stored);
        Ok(remote)
    }

    async fn update(
        &self,
        id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<RemoteObject, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;
        let object = state
            .objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| format!("file {id} not found"))?;
        object.name = name.to_string();
        object.content = content.to_vec();
        Ok(to_remote(object))
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.download_calls += 1;
        state
            .objects
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.content.clone())
            .ok_or_else(|| format!("file {id} not found").into())
    }
}

/// Builds a ZIP archive from `(path, content)` pairs, in the given order.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (path, content) in entries {
        writer.start_file(*path, options).expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}
