pub mod selector;
pub mod topic_stats;
