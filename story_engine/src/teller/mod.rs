//! Teller - lazily writes the story as a reader walks it.
//!
//! The teller sits between a [`Path`] and a [`PageGenerator`]:
//! 1. **Opening**: replay an existing start or generate a new one
//! 2. **Writing**: fill in the current page if it is still unwritten
//! 3. **Offering**: sample at most two next actions, favouring unwritten
//!    branches with a configurable probability
//!
//! Generator calls are retried up to `max_tries` times; running out of tries
//! is reported as [`StoryError::GenerationFailed`], never as an empty page.

mod generator;

pub use generator::*;

use rand::seq::SliceRandom;
use rand::Rng;
use story_model::{Description, Image, Page, PageId, PageType, TellerSettings};
use tracing::{debug, info, warn};

use crate::error::{Result, StoryError};
use crate::path::{action_label, Path};
use crate::story_tree::StoryTree;

/// Action sent to the generator when writing an opening page.
pub const START_ACTION: &str = "start";

/// Drives a [`PageGenerator`] over a story tree.
pub struct Teller<G, R> {
    generator: G,
    rng: R,
    settings: TellerSettings,
}

impl<G: PageGenerator, R: Rng> Teller<G, R> {
    /// Create a teller, rejecting out-of-range settings.
    pub fn new(generator: G, rng: R, settings: TellerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            generator,
            rng,
            settings,
        })
    }

    pub fn settings(&self) -> &TellerSettings {
        &self.settings
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    /// Call the generator with bounded retries.
    ///
    /// A failed call and a malformed response both use up one attempt.
    pub fn generate(&mut self, request: &GenerationRequest) -> Result<GeneratedPage> {
        let mut reason = String::from("no attempts made");

        for attempt in 1..=self.settings.max_tries {
            match self.generator.generate(request) {
                Ok(page) => match self.check_response(&page) {
                    Ok(()) => return Ok(page),
                    Err(problem) => {
                        warn!(attempt, page_number = request.page_number, %problem, "Rejected generated page");
                        reason = problem;
                    }
                },
                Err(err) => {
                    warn!(attempt, page_number = request.page_number, error = %err, "Page generation failed");
                    reason = err.to_string();
                }
            }
        }

        Err(StoryError::GenerationFailed {
            attempts: self.settings.max_tries,
            reason,
        })
    }

    fn check_response(&self, page: &GeneratedPage) -> std::result::Result<(), String> {
        if page.description.trim().is_empty() {
            return Err("empty page description".to_string());
        }
        for action in &page.next_actions {
            let label = action.trim();
            if label.is_empty() {
                return Err("empty action label".to_string());
            }
            if label.chars().count() > self.settings.max_action_chars {
                return Err(format!(
                    "action label '{}' exceeds {} characters",
                    label, self.settings.max_action_chars
                ));
            }
        }
        Ok(())
    }

    /// Take the opening move from the root of the path.
    ///
    /// A new start is generated with probability `new_start_probability`
    /// (always, when the root has no options yet); otherwise one of the
    /// existing options is replayed uniformly. Returns the label taken.
    pub fn begin(&mut self, tree: &mut StoryTree, path: &mut Path) -> Result<String> {
        if path.page_count() != 1 {
            return Err(StoryError::InvalidOperation(
                "a story can only begin from its root".to_string(),
            ));
        }

        let labels: Vec<String> = path.view_action_options(tree)?.into_keys().collect();
        let replay = if labels.is_empty() || self.rng.gen_bool(self.settings.new_start_probability) {
            None
        } else {
            labels.choose(&mut self.rng).cloned()
        };

        let label = match replay {
            Some(label) => label,
            None => self.generate_start(tree, path)?,
        };

        path.take_action(tree, &label)?;
        Ok(label)
    }

    fn generate_start(&mut self, tree: &mut StoryTree, path: &Path) -> Result<String> {
        let root_id = path.root_page_id().clone();
        let root_page = tree
            .get_page(&root_id)
            .ok_or_else(|| StoryError::page_not_found(&root_id))?;

        let request = GenerationRequest {
            context: root_page.text().unwrap_or_default().to_string(),
            page_number: 1,
            pages: Vec::new(),
            karma: root_page.karma,
            action: START_ACTION.to_string(),
        };
        let generated = self.generate(&request)?;

        let start = Page::new(PageType::Start).with_action(START_ACTION);
        let start_id = start.id().clone();
        tree.add_page(start, Some(&root_id))?;
        Self::store_generated(tree, &start_id, generated, false)?;

        let label = tree
            .get_page(&start_id)
            .map(action_label)
            .ok_or_else(|| StoryError::page_not_found(&start_id))?;
        info!(page = %start_id, "Generated new start");
        Ok(label)
    }

    /// Write the current page if it is still unwritten.
    ///
    /// Returns `false` when the page already had content. The path's
    /// finished flag is refreshed, since a written page may end the story.
    pub fn write_current_page(&mut self, tree: &mut StoryTree, path: &mut Path) -> Result<bool> {
        let current = path.get_current_page(tree)?;
        if current.is_written() {
            return Ok(false);
        }
        let current_id = current.id().clone();
        let action = current.action.clone().unwrap_or_default();

        let story_pages: Vec<&Page> = path
            .get_pages(tree)?
            .into_iter()
            .filter(|page| page.page_type != PageType::Context)
            .collect();
        let summaries = story_pages
            .iter()
            .filter(|page| page.id() != &current_id)
            .filter_map(|page| {
                page.text().map(|text| {
                    format!("{}: {}", page.action.as_deref().unwrap_or_default(), text)
                })
            })
            .collect();

        let request = GenerationRequest {
            context: tree
                .context_page()
                .and_then(Page::text)
                .unwrap_or_default()
                .to_string(),
            page_number: story_pages.len(),
            pages: summaries,
            karma: path.compute_karma(tree)?,
            action,
        };

        let generated = self.generate(&request)?;
        let ended = Self::store_generated(tree, &current_id, generated, true)?;
        path.refresh(tree)?;

        info!(page = %current_id, page_number = request.page_number, ended, "Wrote page");
        Ok(true)
    }

    /// Fill a page with generated content and attach its follow-up pages.
    /// Returns whether the page became an ending.
    ///
    /// Openings pass `allow_ending = false`: they keep their START type and
    /// only the non-marker labels become children.
    fn store_generated(
        tree: &mut StoryTree,
        page_id: &PageId,
        generated: GeneratedPage,
        allow_ending: bool,
    ) -> Result<bool> {
        let ending = allow_ending && generated.is_ending();
        let page = tree
            .get_page_mut(page_id)
            .ok_or_else(|| StoryError::page_not_found(page_id))?;

        let mut description = Description::new(generated.description);
        description.image = generated.image.as_ref().and_then(|i| i.description.clone());
        page.description = Some(description);
        page.image = generated.image.map(|i| Image::from_url(i.url));
        page.karma = generated.karma;

        if ending {
            page.page_type = PageType::End;
            return Ok(true);
        }

        let mut children = 0;
        for action in generated.next_actions.iter().filter(|a| !is_end_marker(a)) {
            let child = Page::new(PageType::Action).with_action(action.trim());
            tree.add_page(child, Some(page_id))?;
            children += 1;
        }
        debug!(page = %page_id, children, "Attached next actions");
        Ok(false)
    }

    /// Pick at most two actions to offer from the current page.
    ///
    /// Unwritten and written options are shuffled separately, unwritten first.
    /// Without written options the first two unwritten ones are offered;
    /// otherwise each pick favours the unwritten end of the list with
    /// probability `new_page_probability`.
    pub fn select_next_action_options(
        &mut self,
        tree: &StoryTree,
        path: &Path,
    ) -> Result<Vec<String>> {
        if path.get_current_page(tree)?.is_end() {
            return Ok(Vec::new());
        }

        let mut unwritten = Vec::new();
        let mut written = Vec::new();
        for (label, node) in path.view_action_options(tree)? {
            let page = tree
                .get_page(node.page_id())
                .ok_or_else(|| StoryError::page_not_found(node.page_id()))?;
            if page.is_written() {
                written.push(label);
            } else {
                unwritten.push(label);
            }
        }
        unwritten.shuffle(&mut self.rng);
        written.shuffle(&mut self.rng);

        if written.is_empty() {
            unwritten.truncate(2);
            return Ok(unwritten);
        }

        let mut options = unwritten;
        options.extend(written);
        let last = options.len() - 1;
        let p = self.settings.new_page_probability;

        let first = if self.rng.gen_bool(p) { 0 } else { last };
        let mut picks = vec![options[first].clone()];
        if options.len() > 1 {
            let second = if self.rng.gen_bool(p) { 1 } else { last - 1 };
            if second != first {
                picks.push(options[second].clone());
            }
        }
        Ok(picks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use story_model::KarmaPoints;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct ScriptError(String);

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct ScriptedGenerator {
        responses: VecDeque<std::result::Result<GeneratedPage, ScriptError>>,
        requests: Vec<GenerationRequest>,
    }

    impl ScriptedGenerator {
        fn push(mut self, response: GeneratedPage) -> Self {
            self.responses.push_back(Ok(response));
            self
        }

        fn fail(mut self, message: &str) -> Self {
            self.responses.push_back(Err(ScriptError(message.to_string())));
            self
        }
    }

    impl PageGenerator for ScriptedGenerator {
        type Error = ScriptError;

        fn generate(
            &mut self,
            request: &GenerationRequest,
        ) -> std::result::Result<GeneratedPage, ScriptError> {
            self.requests.push(request.clone());
            self.responses
                .pop_front()
                .unwrap_or_else(|| Err(ScriptError("script exhausted".to_string())))
        }
    }

    fn page(text: &str, actions: &[&str], karma: f64) -> GeneratedPage {
        GeneratedPage {
            description: text.to_string(),
            image: None,
            next_actions: actions.iter().map(|a| a.to_string()).collect(),
            karma: KarmaPoints::new(karma, 0.0, 0.0, 0.0),
        }
    }

    fn settings(new_start: f64, new_page: f64) -> TellerSettings {
        TellerSettings {
            new_start_probability: new_start,
            new_page_probability: new_page,
            ..Default::default()
        }
    }

    fn teller(generator: ScriptedGenerator, s: TellerSettings) -> Teller<ScriptedGenerator, StdRng> {
        Teller::new(generator, StdRng::seed_from_u64(7), s).unwrap()
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let result = Teller::new(
            ScriptedGenerator::default(),
            StdRng::seed_from_u64(1),
            settings(2.0, 0.5),
        );
        assert!(matches!(result, Err(StoryError::Settings(_))));
    }

    #[test]
    fn test_retries_until_success() {
        let generator = ScriptedGenerator::default()
            .fail("timeout")
            .push(page("", &["a"], 0.0))
            .push(page("Written", &["a", "b"], 0.0));
        let mut teller = teller(generator, TellerSettings::default());

        let request = GenerationRequest {
            context: String::new(),
            page_number: 1,
            pages: vec![],
            karma: KarmaPoints::zero(),
            action: "start".to_string(),
        };
        let generated = teller.generate(&request).unwrap();
        assert_eq!(generated.description, "Written");
        assert_eq!(teller.generator().requests.len(), 3);
    }

    #[test]
    fn test_retries_exhausted() {
        let generator = ScriptedGenerator::default()
            .fail("timeout")
            .push(page("Too long", &["an action label far beyond thirty characters"], 0.0))
            .fail("rate limited");
        let mut teller = teller(generator, TellerSettings::default());

        let request = GenerationRequest {
            context: String::new(),
            page_number: 1,
            pages: vec![],
            karma: KarmaPoints::zero(),
            action: "start".to_string(),
        };
        let err = teller.generate(&request).unwrap_err();
        assert!(matches!(
            err,
            StoryError::GenerationFailed { attempts: 3, ref reason } if reason == "rate limited"
        ));
    }

    #[test]
    fn test_begin_generates_start() {
        let generator = ScriptedGenerator::default().push(page("Day one", &["Hide", "Fight"], 0.5));
        let mut teller = teller(generator, settings(0.0, 0.5));
        let mut tree = StoryTree::with_context("The machines woke up");
        let mut path = Path::new(&tree).unwrap();

        let label = teller.begin(&mut tree, &mut path).unwrap();

        assert!(label.starts_with("Start "));
        assert_eq!(path.page_count(), 2);
        let start = path.get_current_page(&tree).unwrap();
        assert_eq!(start.page_type, PageType::Start);
        assert_eq!(start.text(), Some("Day one"));
        assert_eq!(tree.page_count(), 4);

        let request = &teller.generator().requests[0];
        assert_eq!(request.context, "The machines woke up");
        assert_eq!(request.page_number, 1);
        assert_eq!(request.action, "start");

        let options = path.view_action_options(&tree).unwrap();
        assert!(options.contains_key("Hide") && options.contains_key("Fight"));
    }

    #[test]
    fn test_begin_keeps_opening_without_choices() {
        for actions in [&[][..], &["End"][..], &[" end ", "Hide"][..]] {
            let generator = ScriptedGenerator::default().push(page("Day one", actions, 0.0));
            let mut teller = teller(generator, settings(1.0, 0.5));
            let mut tree = StoryTree::with_context("Premise");
            let mut path = Path::new(&tree).unwrap();

            let label = teller.begin(&mut tree, &mut path).unwrap();

            assert!(label.starts_with("Start "));
            assert_eq!(path.page_count(), 2);
            assert!(!path.is_finished());
            let start = path.get_current_page(&tree).unwrap();
            assert_eq!(start.page_type, PageType::Start);
            assert_eq!(start.text(), Some("Day one"));

            let options = path.view_action_options(&tree).unwrap();
            assert!(!options.keys().any(|label| is_end_marker(label)));
            assert_eq!(options.len(), actions.len().saturating_sub(1));
        }
    }

    #[test]
    fn test_begin_replays_existing_start() {
        let generator = ScriptedGenerator::default().push(page("Day one", &["Hide"], 0.0));
        let mut teller = teller(generator, settings(1.0, 0.5));
        let mut tree = StoryTree::with_context("Premise");

        let mut first = Path::new(&tree).unwrap();
        let label = teller.begin(&mut tree, &mut first).unwrap();

        teller.settings.new_start_probability = 0.0;
        let mut second = Path::new(&tree).unwrap();
        assert_eq!(teller.begin(&mut tree, &mut second).unwrap(), label);
        assert_eq!(teller.generator().requests.len(), 1);
    }

    #[test]
    fn test_begin_only_at_root() {
        let generator = ScriptedGenerator::default().push(page("Day one", &["Hide"], 0.0));
        let mut teller = teller(generator, settings(1.0, 0.5));
        let mut tree = StoryTree::with_context("Premise");
        let mut path = Path::new(&tree).unwrap();
        teller.begin(&mut tree, &mut path).unwrap();

        let err = teller.begin(&mut tree, &mut path).unwrap_err();
        assert!(matches!(err, StoryError::InvalidOperation(_)));
    }

    #[test]
    fn test_write_current_page() {
        let generator = ScriptedGenerator::default()
            .push(page("Day one", &["Hide", "Fight"], 0.5))
            .push(page("You hid.", &["Wait", "Run"], 0.25));
        let mut teller = teller(generator, settings(1.0, 0.5));
        let mut tree = StoryTree::with_context("Premise");
        let mut path = Path::new(&tree).unwrap();
        teller.begin(&mut tree, &mut path).unwrap();

        assert!(!teller.write_current_page(&mut tree, &mut path).unwrap());

        path.take_action(&tree, "Hide").unwrap();
        assert!(teller.write_current_page(&mut tree, &mut path).unwrap());

        let current = path.get_current_page(&tree).unwrap();
        assert_eq!(current.text(), Some("You hid."));
        assert_eq!(current.karma.technology, 0.25);
        assert_eq!(path.view_action_options(&tree).unwrap().len(), 2);

        let request = &teller.generator().requests[1];
        assert_eq!(request.page_number, 2);
        assert_eq!(request.action, "Hide");
        assert_eq!(request.pages, vec!["start: Day one".to_string()]);
        assert_eq!(request.karma.technology, 0.5);
        assert_eq!(request.context, "Premise");
    }

    #[test]
    fn test_write_ending_page() {
        let generator = ScriptedGenerator::default()
            .push(page("Day one", &["Hide"], 0.0))
            .push(page("It is over.", &["End"], -0.5));
        let mut teller = teller(generator, settings(1.0, 0.5));
        let mut tree = StoryTree::with_context("Premise");
        let mut path = Path::new(&tree).unwrap();
        teller.begin(&mut tree, &mut path).unwrap();
        path.take_action(&tree, "Hide").unwrap();

        teller.write_current_page(&mut tree, &mut path).unwrap();

        assert!(path.is_finished());
        assert!(path.get_current_page(&tree).unwrap().is_end());
        assert!(path.view_action_options(&tree).unwrap().is_empty());
        assert!(teller.select_next_action_options(&tree, &path).unwrap().is_empty());
    }

    #[test]
    fn test_generation_failure_leaves_page_unwritten() {
        let generator = ScriptedGenerator::default().push(page("Day one", &["Hide"], 0.0));
        let mut teller = teller(generator, settings(1.0, 0.5));
        let mut tree = StoryTree::with_context("Premise");
        let mut path = Path::new(&tree).unwrap();
        teller.begin(&mut tree, &mut path).unwrap();
        path.take_action(&tree, "Hide").unwrap();

        let err = teller.write_current_page(&mut tree, &mut path).unwrap_err();
        assert!(matches!(err, StoryError::GenerationFailed { .. }));
        assert!(!path.get_current_page(&tree).unwrap().is_written());
    }

    fn tree_with_options(written: &[&str], unwritten: &[&str]) -> (StoryTree, Path) {
        let mut tree = StoryTree::new();
        let root = Page::new(PageType::Start)
            .with_action("start")
            .with_description(Description::new("Root"));
        let root_id = root.id().clone();
        tree.add_page(root, None).unwrap();
        for action in written {
            let child = Page::new(PageType::Action)
                .with_action(*action)
                .with_description(Description::new("Done"));
            tree.add_page(child, Some(&root_id)).unwrap();
        }
        for action in unwritten {
            tree.add_page(Page::new(PageType::Action).with_action(*action), Some(&root_id))
                .unwrap();
        }
        let path = Path::new(&tree).unwrap();
        (tree, path)
    }

    #[test]
    fn test_select_only_unwritten() {
        let (tree, path) = tree_with_options(&[], &["a", "b", "c"]);
        let mut teller = teller(ScriptedGenerator::default(), TellerSettings::default());

        let picks = teller.select_next_action_options(&tree, &path).unwrap();
        assert_eq!(picks.len(), 2);
        assert_ne!(picks[0], picks[1]);
    }

    #[test]
    fn test_select_prefers_unwritten() {
        let (tree, path) = tree_with_options(&["old1", "old2"], &["new1", "new2"]);
        let mut teller = teller(ScriptedGenerator::default(), settings(0.5, 1.0));

        let mut picks = teller.select_next_action_options(&tree, &path).unwrap();
        picks.sort();
        assert_eq!(picks, vec!["new1".to_string(), "new2".to_string()]);
    }

    #[test]
    fn test_select_prefers_written() {
        let (tree, path) = tree_with_options(&["old1", "old2"], &["new1", "new2"]);
        let mut teller = teller(ScriptedGenerator::default(), settings(0.5, 0.0));

        let mut picks = teller.select_next_action_options(&tree, &path).unwrap();
        picks.sort();
        assert_eq!(picks, vec!["old1".to_string(), "old2".to_string()]);
    }

    #[test]
    fn test_select_single_option() {
        let (tree, path) = tree_with_options(&["only"], &[]);
        let mut teller = teller(ScriptedGenerator::default(), TellerSettings::default());

        let picks = teller.select_next_action_options(&tree, &path).unwrap();
        assert_eq!(picks, vec!["only".to_string()]);
    }
}
