use std::collections::BTreeSet;

use rand::Rng;

use super::{Deck, PromptKind, Question, Slide, balancer};

/// Display mode of the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Both actions and questions.
    Mixed,
    /// Questions ("Frage") only.
    QuestionsOnly,
}

impl Mode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "questions" => Self::QuestionsOnly,
            _ => Self::Mixed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mixed => "mixed",
            Self::QuestionsOnly => "questions",
        }
    }
}

/// Builds the ordered slide list from the loaded questions and keeps the current index valid.
pub struct Sequencer {
    questions: Vec<Question>,
    intro: Option<Question>,
    show_intro: bool,
    categories: Vec<String>,
    selected: BTreeSet<String>,
    mode: Mode,
    mode_toggled: bool,
    slides: Vec<Slide>,
    index: usize,
}

impl Sequencer {
    /// Create a sequencer with every category selected. Slides are empty until the first
    /// [`Sequencer::rebuild`].
    pub fn new(deck: Deck, mode: Mode) -> Self {
        let categories = deck.categories();
        let selected = categories.iter().cloned().collect();
        Self {
            questions: deck.questions,
            intro: deck.intro,
            show_intro: false,
            categories,
            selected,
            mode,
            mode_toggled: false,
            slides: Vec::new(),
            index: 0,
        }
    }

    pub fn with_intro(mut self, show: bool) -> Self {
        self.show_intro = show;
        self
    }

    /// Restrict the initial selection. Unknown names are ignored; an empty result keeps all.
    pub fn with_selection(mut self, names: &[String]) -> Self {
        let chosen: BTreeSet<String> = names
            .iter()
            .filter(|n| self.categories.contains(n))
            .cloned()
            .collect();
        if !chosen.is_empty() {
            self.selected = chosen;
        }
        self
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Every category in the loaded deck, in first-appearance order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Position of a category in [`Sequencer::categories`], used for fallback colors.
    pub fn category_position(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    /// Number of loaded prompts in `category`, regardless of mode and selection.
    pub fn count_in(&self, category: &str) -> usize {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .count()
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn mode_toggled(&self) -> bool {
        self.mode_toggled
    }

    /// Move to `index` if it refers to an existing slide.
    pub fn set_index(&mut self, index: usize) -> bool {
        if index < self.slides.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Switch mode. Returns true when the mode actually changed and the slides were rebuilt.
    pub fn set_mode<R: Rng + ?Sized>(&mut self, mode: Mode, rng: &mut R) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        self.mode_toggled = true;
        tracing::debug!(mode = mode.name(), "display mode changed");
        self.rebuild(rng);
        true
    }

    /// Apply a new category selection. Returns true when it differed and slides were rebuilt.
    pub fn set_selected<R: Rng + ?Sized>(
        &mut self,
        selected: BTreeSet<String>,
        rng: &mut R,
    ) -> bool {
        if selected == self.selected {
            return false;
        }
        self.selected = selected;
        tracing::debug!(count = self.selected.len(), "category selection changed");
        self.rebuild(rng);
        true
    }

    /// Recompute the slide list from the current selection and mode, and reset the index.
    pub fn rebuild<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let filtered: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| self.selected.contains(&q.category))
            .filter(|q| self.mode == Mode::Mixed || q.kind == PromptKind::Question)
            .cloned()
            .collect();

        let ordered = if self.mode == Mode::Mixed && self.mode_toggled {
            let (actions, questions): (Vec<Question>, Vec<Question>) = filtered
                .into_iter()
                .partition(|q| q.kind == PromptKind::Action);
            let mut ordered = balancer::balance(actions, rng);
            ordered.extend(balancer::balance(questions, rng));
            ordered
        } else {
            balancer::balance(filtered, rng)
        };

        let mut slides = Vec::with_capacity(ordered.len() + 1);
        if self.show_intro {
            if let Some(intro) = &self.intro {
                slides.push(Slide::Intro(intro.clone()));
            }
        }
        slides.extend(ordered.into_iter().map(Slide::Question));

        self.replace_slides(slides);
        self.index = 0;
        tracing::debug!(slides = self.slides.len(), "slide sequence rebuilt");
    }

    /// Swap in a new slide list, clamping the index if the length changed.
    pub fn replace_slides(&mut self, slides: Vec<Slide>) {
        let length_changed = slides.len() != self.slides.len();
        self.slides = slides;
        if length_changed {
            self.clamp_index();
        }
    }

    fn clamp_index(&mut self) {
        self.index = if self.slides.is_empty() {
            0
        } else {
            self.index.min(self.slides.len() - 1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::balancer::longest_category_run;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn q(text: &str, category: &str, kind: PromptKind) -> Question {
        Question::new(text, category, kind)
    }

    fn deck(questions: Vec<Question>) -> Deck {
        Deck {
            questions,
            intro: None,
        }
    }

    fn texts(seq: &Sequencer) -> Vec<String> {
        seq.slides().iter().map(|s| s.text().to_string()).collect()
    }

    fn eight_questions() -> Vec<Question> {
        (0..4)
            .map(|i| q(&format!("a{i}"), "A", PromptKind::Question))
            .chain((0..4).map(|i| q(&format!("b{i}"), "B", PromptKind::Question)))
            .collect()
    }

    #[test]
    fn test_new_selects_everything() {
        let seq = Sequencer::new(deck(eight_questions()), Mode::Mixed);
        assert_eq!(seq.categories(), &["A".to_string(), "B".to_string()]);
        assert_eq!(seq.selected().len(), 2);
        assert!(seq.is_empty());
    }

    #[test]
    fn test_end_to_end_questions_only() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut seq = Sequencer::new(deck(eight_questions()), Mode::QuestionsOnly);
            seq.rebuild(&mut rng);
            assert_eq!(seq.len(), 8);
            let mut got = texts(&seq);
            got.sort();
            assert_eq!(got, vec!["a0", "a1", "a2", "a3", "b0", "b1", "b2", "b3"]);
            let questions: Vec<Question> = seq
                .slides()
                .iter()
                .filter_map(|s| s.question().cloned())
                .collect();
            assert!(longest_category_run(&questions) < 3, "seed {seed}");
        }
    }

    #[test]
    fn test_questions_only_filters_actions() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seq = Sequencer::new(
            deck(vec![
                q("A", "X", PromptKind::Question),
                q("B", "X", PromptKind::Action),
                q("C", "Y", PromptKind::Question),
            ]),
            Mode::QuestionsOnly,
        );
        seq.rebuild(&mut rng);
        let mut got = texts(&seq);
        got.sort();
        assert_eq!(got, vec!["A", "C"]);
    }

    #[test]
    fn test_mixed_after_toggle_puts_actions_first() {
        let questions = vec![
            q("A", "K1", PromptKind::Question),
            q("B", "K1", PromptKind::Action),
            q("C", "K2", PromptKind::Question),
            q("D", "K2", PromptKind::Action),
        ];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut seq = Sequencer::new(deck(questions.clone()), Mode::QuestionsOnly);
            seq.rebuild(&mut rng);
            assert!(seq.set_mode(Mode::Mixed, &mut rng));
            assert!(seq.mode_toggled());
            let got = texts(&seq);
            assert_eq!(got.len(), 4);
            let mut head: Vec<&str> = got[..2].iter().map(|s| s.as_str()).collect();
            let mut tail: Vec<&str> = got[2..].iter().map(|s| s.as_str()).collect();
            head.sort();
            tail.sort();
            assert_eq!(head, vec!["B", "D"], "seed {seed}");
            assert_eq!(tail, vec!["A", "C"], "seed {seed}");
        }
    }

    #[test]
    fn test_untouched_mixed_mode_does_not_prioritize_actions() {
        let questions: Vec<Question> = (0..6)
            .map(|i| q(&format!("f{i}"), "K", PromptKind::Question))
            .chain((0..6).map(|i| q(&format!("a{i}"), "K", PromptKind::Action)))
            .collect();
        let question_first = (0..50).any(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut seq = Sequencer::new(deck(questions.clone()), Mode::Mixed);
            seq.rebuild(&mut rng);
            seq.slides()[0].question().map(|q| q.kind) == Some(PromptKind::Question)
        });
        assert!(question_first);
    }

    #[test]
    fn test_set_same_mode_is_noop() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut seq = Sequencer::new(deck(eight_questions()), Mode::Mixed);
        seq.rebuild(&mut rng);
        seq.set_index(4);
        assert!(!seq.set_mode(Mode::Mixed, &mut rng));
        assert!(!seq.mode_toggled());
        assert_eq!(seq.index(), 4);
    }

    #[test]
    fn test_rebuild_resets_index() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut seq = Sequencer::new(deck(eight_questions()), Mode::Mixed);
        seq.rebuild(&mut rng);
        assert!(seq.set_index(6));
        let only_a: BTreeSet<String> = ["A".to_string()].into_iter().collect();
        assert!(seq.set_selected(only_a.clone(), &mut rng));
        assert_eq!(seq.index(), 0);
        assert_eq!(seq.len(), 4);
        assert!(seq.slides().iter().all(|s| s.question().unwrap().category == "A"));
        assert!(!seq.set_selected(only_a, &mut rng));
    }

    #[test]
    fn test_empty_selection_yields_no_slides() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seq = Sequencer::new(deck(eight_questions()), Mode::Mixed);
        seq.rebuild(&mut rng);
        seq.set_selected(BTreeSet::new(), &mut rng);
        assert!(seq.is_empty());
        assert_eq!(seq.index(), 0);
        assert!(seq.slide(seq.index()).is_none());
        assert!(!seq.set_index(0));
    }

    #[test]
    fn test_index_clamp_on_length_changes() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut seq = Sequencer::new(deck(eight_questions()), Mode::Mixed);
        seq.rebuild(&mut rng);
        let full: Vec<Slide> = seq.slides().to_vec();

        for len in [8usize, 3, 0, 5, 1, 8, 2] {
            seq.set_index(seq.len().saturating_sub(1));
            seq.replace_slides(full[..len].to_vec());
            if len == 0 {
                assert_eq!(seq.index(), 0);
            } else {
                assert!(seq.index() < len, "len {len}, index {}", seq.index());
            }
        }
    }

    #[test]
    fn test_with_selection_ignores_unknown_names() {
        let seq = Sequencer::new(deck(eight_questions()), Mode::Mixed)
            .with_selection(&["B".to_string(), "Nope".to_string()]);
        assert_eq!(seq.selected().len(), 1);
        assert!(seq.selected().contains("B"));

        let seq = Sequencer::new(deck(eight_questions()), Mode::Mixed)
            .with_selection(&["Nope".to_string()]);
        assert_eq!(seq.selected().len(), 2);
    }

    #[test]
    fn test_intro_slide_leads_when_enabled() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut d = deck(eight_questions());
        d.intro = Some(q("Welcome", "Intro", PromptKind::Question));
        let mut seq = Sequencer::new(d, Mode::Mixed).with_intro(true);
        seq.rebuild(&mut rng);
        assert_eq!(seq.len(), 9);
        assert!(matches!(seq.slides()[0], Slide::Intro(_)));
        assert!(seq.slides()[1..].iter().all(|s| s.question().is_some()));
    }
}
