#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicStat {
    pub topic: String,
    pub total: usize,
    pub correct: usize,
}

impl TopicStat {
    /// correct / total as a ratio, 0.0 when nothing has been answered.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    pub fn rate_percent(&self) -> f64 {
        self.accuracy() * 100.0
    }
}

/// Per-topic running counters, kept in first-seen order. That order is the
/// tie-break for [`TopicStatsStore::weakest`].
#[derive(Clone, Debug, Default)]
pub struct TopicStatsStore {
    stats: Vec<TopicStat>,
}

impl TopicStatsStore {
    pub fn record(&mut self, topic: &str, correct: bool) {
        let stat = match self.stats.iter().position(|s| s.topic == topic) {
            Some(idx) => &mut self.stats[idx],
            None => {
                self.stats.push(TopicStat {
                    topic: topic.to_string(),
                    ..TopicStat::default()
                });
                let last = self.stats.len() - 1;
                &mut self.stats[last]
            }
        };
        stat.total += 1;
        if correct {
            stat.correct += 1;
        }
    }

    pub fn get(&self, topic: &str) -> Option<&TopicStat> {
        self.stats.iter().find(|s| s.topic == topic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicStat> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn clear(&mut self) {
        self.stats.clear();
    }

    /// Topic with strictly lowest accuracy; the first one seen wins ties.
    pub fn weakest(&self) -> Option<&TopicStat> {
        let mut weakest: Option<&TopicStat> = None;
        for stat in &self.stats {
            match weakest {
                Some(w) if stat.accuracy() >= w.accuracy() => {}
                _ => weakest = Some(stat),
            }
        }
        weakest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_weakest() {
        let store = TopicStatsStore::default();
        assert!(store.weakest().is_none());
        assert!(store.get("A").is_none());
    }

    #[test]
    fn record_creates_and_counts() {
        let mut store = TopicStatsStore::default();
        store.record("A", true);
        store.record("A", false);
        store.record("B", true);
        let a = store.get("A").unwrap();
        assert_eq!((a.total, a.correct), (2, 1));
        assert_eq!(a.accuracy(), 0.5);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn keeps_first_seen_order() {
        let mut store = TopicStatsStore::default();
        store.record("B", true);
        store.record("A", true);
        store.record("B", false);
        let order: Vec<&str> = store.iter().map(|s| s.topic.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn weakest_picks_lowest_accuracy() {
        let mut store = TopicStatsStore::default();
        store.record("A", true);
        store.record("B", false);
        store.record("C", true);
        store.record("C", false);
        assert_eq!(store.weakest().unwrap().topic, "B");
    }

    #[test]
    fn weakest_tie_goes_to_first_seen() {
        let mut store = TopicStatsStore::default();
        store.record("A", true);
        store.record("A", false);
        store.record("B", false);
        store.record("B", true);
        assert_eq!(store.weakest().unwrap().topic, "A");
    }

    #[test]
    fn correct_never_exceeds_total() {
        let mut store = TopicStatsStore::default();
        for i in 0..20 {
            store.record(if i % 3 == 0 { "A" } else { "B" }, i % 2 == 0);
        }
        for stat in store.iter() {
            assert!(stat.total >= stat.correct);
        }
    }
}
