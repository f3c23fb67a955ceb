pub mod exam_result;
pub mod notes_panel;
pub mod progress_bar;
pub mod question_card;
pub mod question_list;
pub mod quiz_sidebar;
pub mod score_panel;
pub mod tab_bar;
pub mod topic_progress;
