use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::TopicCatalog;
use crate::engine::topic_stats::TopicStatsStore;
use crate::session::question::Question;

/// The major topic and keyword a new question should be generated for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicChoice {
    pub main_topic: String,
    pub keyword: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Show a previously missed question again, verbatim. No generation.
    Replay(Question),
    Generate(TopicChoice),
}

/// Inputs the selector reads from the session.
pub struct SelectorInput<'a> {
    pub review_mode: bool,
    pub weak_mode: bool,
    pub selected_topic: &'a str,
    pub wrong_history: &'a [Question],
    pub topic_stats: &'a TopicStatsStore,
}

pub fn select<R: Rng + ?Sized>(
    input: &SelectorInput<'_>,
    catalog: &TopicCatalog,
    rng: &mut R,
) -> Selection {
    if input.review_mode {
        if let Some(q) = input.wrong_history.choose(rng) {
            return Selection::Replay(q.clone());
        }
    }

    let main_topic = resolve_topic(input, catalog);
    let keyword = catalog
        .keywords(main_topic)
        .and_then(|kws| kws.choose(rng))
        .cloned()
        .unwrap_or_default();

    Selection::Generate(TopicChoice {
        main_topic: main_topic.to_string(),
        keyword,
    })
}

/// Major topic for a generated question. Always a catalog topic.
fn resolve_topic<'a>(input: &SelectorInput<'_>, catalog: &'a TopicCatalog) -> &'a str {
    let wanted = match input.topic_stats.weakest() {
        Some(weakest) if input.weak_mode => weakest.topic.as_str(),
        _ => input.selected_topic,
    };
    catalog
        .topics()
        .find(|t| *t == wanted)
        .unwrap_or_else(|| catalog.first())
}
