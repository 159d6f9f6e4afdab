//! 内存存储
//!
//! 使用 DashMap 实现的高并发内存表，按自增 id 存放记录，适用于开发环境和测试。

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

/// 通用内存表
///
/// 克隆后共享同一份数据
#[derive(Debug)]
pub struct MemoryStore<T> {
    data: Arc<DashMap<i64, T>>,
    next_id: Arc<AtomicI64>,
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// 分配下一个自增 id，从 1 开始
    pub fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// 插入或覆盖
    pub fn insert(&self, id: i64, value: T) {
        self.data.insert(id, value);
    }

    /// 获取数据，返回克隆，不持有锁
    pub fn get(&self, id: i64) -> Option<T> {
        self.data.get(&id).map(|v| v.clone())
    }

    /// 查找第一条满足条件的数据
    pub fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.data
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }

    /// 按条件筛选数据
    pub fn list_by<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.data
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn list(&self) -> Vec<T> {
        self.list_by(|_| true)
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestItem {
        id: i64,
        name: String,
    }

    fn item(store: &MemoryStore<TestItem>, name: &str) -> TestItem {
        let item = TestItem {
            id: store.next_id(),
            name: name.to_string(),
        };
        store.insert(item.id, item.clone());
        item
    }

    #[test]
    fn test_ids_are_sequential() {
        let store = MemoryStore::<TestItem>::new();
        assert_eq!(item(&store, "a").id, 1);
        assert_eq!(item(&store, "b").id, 2);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_get_find_and_filter() {
        let store = MemoryStore::new();
        let a = item(&store, "alpha");
        item(&store, "beta");
        item(&store, "gamma");

        assert_eq!(store.get(a.id), Some(a));
        assert_eq!(store.get(99), None);
        assert_eq!(store.find(|i| i.name == "beta").map(|i| i.id), Some(2));
        assert_eq!(store.list_by(|i| i.name.contains('a')).len(), 3);
        assert_eq!(store.list_by(|i| i.name.starts_with('g')).len(), 1);
    }

    #[test]
    fn test_clone_shares_data() {
        let store = MemoryStore::new();
        let cloned = store.clone();
        item(&store, "shared");
        assert_eq!(cloned.count(), 1);
        assert_eq!(cloned.next_id(), 2);
    }
}
