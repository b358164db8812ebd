//! Shared test doubles
//!
//! A programmable in-memory `Store` so pipeline tests can run without a
//! backend.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use streamgate::store::{
    AddMagnetData, AddMagnetParams, CheckMagnetData, CheckMagnetItem, CheckMagnetParams,
    GenerateLinkData, GenerateLinkParams, GetMagnetData, GetMagnetParams, GetUserParams,
    ListMagnetsData, ListMagnetsParams, MagnetFile, MagnetStatus, RemoveMagnetData,
    RemoveMagnetParams, Store, StoreError, StoreName, SubscriptionStatus, User,
};

pub struct MockStore {
    name: StoreName,
    /// hashes this backend reports as cached
    cached: Vec<String>,
    /// fail every check_magnet call
    fail_check: bool,
    /// delay applied inside add_magnet
    add_delay: Duration,
    /// status returned by add_magnet
    add_status: MagnetStatus,
    /// statuses returned by successive get_magnet calls (last one repeats)
    poll_statuses: Mutex<Vec<MagnetStatus>>,
    /// files reported once downloaded
    files: Vec<MagnetFile>,

    pub check_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub link_calls: AtomicUsize,
}

impl MockStore {
    pub fn new(name: StoreName) -> Self {
        MockStore {
            name,
            cached: Vec::new(),
            fail_check: false,
            add_delay: Duration::ZERO,
            add_status: MagnetStatus::Downloaded,
            poll_statuses: Mutex::new(Vec::new()),
            files: Vec::new(),
            check_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            link_calls: AtomicUsize::new(0),
        }
    }

    pub fn cached(mut self, hashes: &[&str]) -> Self {
        self.cached = hashes.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn failing_check(mut self) -> Self {
        self.fail_check = true;
        self
    }

    pub fn add_delay(mut self, delay: Duration) -> Self {
        self.add_delay = delay;
        self
    }

    pub fn add_status(mut self, status: MagnetStatus) -> Self {
        self.add_status = status;
        self
    }

    pub fn poll_statuses(self, statuses: &[MagnetStatus]) -> Self {
        *self.poll_statuses.lock().unwrap() = statuses.to_vec();
        self
    }

    pub fn files(mut self, files: Vec<MagnetFile>) -> Self {
        self.files = files;
        self
    }
}

pub fn video_file(idx: i64, name: &str, size: u64) -> MagnetFile {
    MagnetFile {
        idx,
        link: format!("https://backend.example/dl/{}", idx),
        name: name.to_string(),
        path: String::new(),
        size,
    }
}

#[async_trait]
impl Store for MockStore {
    fn name(&self) -> StoreName {
        self.name
    }

    async fn get_user(&self, _params: &GetUserParams) -> Result<User, StoreError> {
        Ok(User {
            id: "user".to_string(),
            email: String::new(),
            subscription_status: SubscriptionStatus::Premium,
        })
    }

    async fn check_magnet(
        &self,
        params: &CheckMagnetParams,
    ) -> Result<CheckMagnetData, StoreError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_check {
            return Err(StoreError::Upstream {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(CheckMagnetData {
            items: params
                .magnets
                .iter()
                .map(|hash| CheckMagnetItem {
                    hash: hash.clone(),
                    magnet: String::new(),
                    status: if self.cached.contains(hash) {
                        MagnetStatus::Cached
                    } else {
                        MagnetStatus::Unknown
                    },
                    files: Vec::new(),
                })
                .collect(),
        })
    }

    async fn add_magnet(&self, params: &AddMagnetParams) -> Result<AddMagnetData, StoreError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if !self.add_delay.is_zero() {
            tokio::time::sleep(self.add_delay).await;
        }
        Ok(AddMagnetData {
            id: "magnet-1".to_string(),
            hash: params.magnet.clone(),
            magnet: params.magnet.clone(),
            name: "magnet".to_string(),
            status: self.add_status,
            files: if self.add_status == MagnetStatus::Downloaded {
                self.files.clone()
            } else {
                Vec::new()
            },
        })
    }

    async fn get_magnet(&self, _params: &GetMagnetParams) -> Result<GetMagnetData, StoreError> {
        let calls = self.get_calls.fetch_add(1, Ordering::SeqCst);
        let statuses = self.poll_statuses.lock().unwrap();
        let status = statuses
            .get(calls)
            .or(statuses.last())
            .copied()
            .unwrap_or(self.add_status);
        Ok(GetMagnetData {
            id: "magnet-1".to_string(),
            hash: String::new(),
            name: "magnet".to_string(),
            status,
            files: if status == MagnetStatus::Downloaded {
                self.files.clone()
            } else {
                Vec::new()
            },
        })
    }

    async fn list_magnets(
        &self,
        _params: &ListMagnetsParams,
    ) -> Result<ListMagnetsData, StoreError> {
        Ok(ListMagnetsData { items: Vec::new() })
    }

    async fn remove_magnet(
        &self,
        params: &RemoveMagnetParams,
    ) -> Result<RemoveMagnetData, StoreError> {
        Ok(RemoveMagnetData {
            id: params.id.clone(),
        })
    }

    async fn generate_link(
        &self,
        params: &GenerateLinkParams,
    ) -> Result<GenerateLinkData, StoreError> {
        self.link_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GenerateLinkData {
            link: format!("{}?signed=1", params.link),
        })
    }
}
