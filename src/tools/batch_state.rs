//! 批处理状态管理模块
//!
//! 提供统一的校验统计管理，支持串行和并行两种模式。
//! 单工程模式下统计bin，批量模式下统计工程。

use crate::error::ErrorCategory;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 批处理统计快照
#[derive(Debug, Clone, Default)]
pub struct BatchStatsSnapshot {
    /// 检查通过的条目数
    pub passed: usize,
    /// 哈希不匹配的条目数（非致命）
    pub mismatched: usize,
    /// 失败的条目数
    pub failed: usize,
    /// 错误分类统计（错误类型 -> 失败条目列表）
    pub error_stats: HashMap<ErrorCategory, Vec<String>>,
}

impl BatchStatsSnapshot {
    pub fn total(&self) -> usize {
        self.passed + self.mismatched + self.failed
    }

    /// 是否全部通过
    pub fn is_clean(&self) -> bool {
        self.mismatched == 0 && self.failed == 0
    }

    /// 可序列化的计数摘要
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            total: self.total(),
            passed: self.passed,
            mismatched: self.mismatched,
            failed: self.failed,
        }
    }
}

/// 报告中的计数摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total: usize,
    pub passed: usize,
    pub mismatched: usize,
    pub failed: usize,
}

/// 单个条目在统计中的归类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    Passed,
    Mismatched,
    Failed(ErrorCategory),
}

/// 串行批处理统计（单线程安全）
#[derive(Debug, Default)]
pub struct SerialBatchStats {
    passed: usize,
    mismatched: usize,
    failed: usize,
    error_stats: HashMap<ErrorCategory, Vec<String>>,
}

impl SerialBatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_passed(&mut self) -> usize {
        self.passed += 1;
        self.passed
    }

    /// 增加不匹配计数，同时计入校验错误分类
    #[inline]
    pub fn inc_mismatched(&mut self, name: String) -> usize {
        self.mismatched += 1;
        self.error_stats
            .entry(ErrorCategory::Integrity)
            .or_default()
            .push(name);
        self.mismatched
    }

    /// 增加失败计数并记录错误分类
    #[inline]
    pub fn inc_failed(&mut self, category: ErrorCategory, name: String) -> usize {
        self.failed += 1;
        self.error_stats.entry(category).or_default().push(name);
        self.failed
    }

    pub fn record(&mut self, tally: Tally, name: String) -> usize {
        match tally {
            Tally::Passed => self.inc_passed(),
            Tally::Mismatched => self.inc_mismatched(name),
            Tally::Failed(category) => self.inc_failed(category, name),
        }
    }

    pub fn snapshot(&self) -> BatchStatsSnapshot {
        BatchStatsSnapshot {
            passed: self.passed,
            mismatched: self.mismatched,
            failed: self.failed,
            error_stats: self.error_stats.clone(),
        }
    }
}

/// 并行批处理统计（多线程安全）
///
/// 使用原子类型和锁，克隆后共享同一状态
#[derive(Debug, Clone, Default)]
pub struct ParallelBatchStats {
    passed: Arc<AtomicUsize>,
    mismatched: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    error_stats: Arc<Mutex<HashMap<ErrorCategory, Vec<String>>>>,
}

impl ParallelBatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_passed(&self) -> usize {
        self.passed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn inc_mismatched(&self, name: String) -> usize {
        let count = self.mismatched.fetch_add(1, Ordering::Relaxed) + 1;
        self.push_error(ErrorCategory::Integrity, name);
        count
    }

    pub fn inc_failed(&self, category: ErrorCategory, name: String) -> usize {
        let count = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
        self.push_error(category, name);
        count
    }

    pub fn record(&self, tally: Tally, name: String) -> usize {
        match tally {
            Tally::Passed => self.inc_passed(),
            Tally::Mismatched => self.inc_mismatched(name),
            Tally::Failed(category) => self.inc_failed(category, name),
        }
    }

    fn push_error(&self, category: ErrorCategory, name: String) {
        if let Ok(mut stats) = self.error_stats.lock() {
            stats.entry(category).or_default().push(name);
        }
    }

    /// 获取统计快照（各分类内按名称排序，消除线程调度带来的顺序差异）
    pub fn snapshot(&self) -> BatchStatsSnapshot {
        let mut error_stats = self
            .error_stats
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default();
        for names in error_stats.values_mut() {
            names.sort();
        }

        BatchStatsSnapshot {
            passed: self.passed.load(Ordering::Relaxed),
            mismatched: self.mismatched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            error_stats,
        }
    }
}
