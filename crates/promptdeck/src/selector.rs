//! Category selection dialog.
//!
//! Edits a working copy of the selection. Nothing reaches the session until the user applies;
//! closing the dialog throws the working copy away.

use std::collections::BTreeSet;

use eframe::egui;

use crate::theme::{ColorPair, Theme};

#[derive(Debug, Default)]
pub struct CategorySelector {
    draft: Option<BTreeSet<String>>,
}

/// What the user did in the dialog this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorAction {
    None,
    Apply(BTreeSet<String>),
    Close,
}

impl CategorySelector {
    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// Open with a copy of the current selection.
    pub fn open(&mut self, selected: &BTreeSet<String>) {
        self.draft = Some(selected.clone());
    }

    pub fn close(&mut self) {
        self.draft = None;
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.draft.as_ref().is_some_and(|d| d.contains(category))
    }

    pub fn toggle(&mut self, category: &str) {
        if let Some(draft) = &mut self.draft {
            if !draft.remove(category) {
                draft.insert(category.to_string());
            }
        }
    }

    pub fn select_all(&mut self, categories: &[String]) {
        if let Some(draft) = &mut self.draft {
            draft.extend(categories.iter().cloned());
        }
    }

    pub fn clear(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.clear();
        }
    }

    /// Close the dialog and hand back the working copy.
    pub fn apply(&mut self) -> Option<BTreeSet<String>> {
        self.draft.take()
    }

    /// Draw the dialog. Each entry is a category, its prompt count and its colors.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        categories: &[(String, usize, ColorPair)],
        theme: &Theme,
    ) -> SelectorAction {
        if !self.is_open() {
            return SelectorAction::None;
        }

        let mut apply = false;
        let mut cancel = false;
        let mut toggled: Option<String> = None;
        let names: Vec<String> = categories.iter().map(|(n, _, _)| n.clone()).collect();
        let mut all = false;
        let mut none = false;

        egui::Window::new("Kategorien")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .frame(egui::Frame::window(&ctx.style()).fill(theme.panel))
            .show(ctx, |ui| {
                ui.set_min_width(320.0);
                for (name, count, colors) in categories {
                    let mut checked = self.is_selected(name);
                    let label = egui::RichText::new(format!("{name} ({count})"))
                        .size(theme.label_size + 2.0)
                        .color(colors.accent);
                    if ui.checkbox(&mut checked, label).changed() {
                        toggled = Some(name.clone());
                    }
                }
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    all = ui.button("Alle").clicked();
                    none = ui.button("Keine").clicked();
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        apply = ui.button("Übernehmen").clicked();
                        cancel = ui.button("Abbrechen").clicked();
                    });
                });
            });

        if let Some(name) = toggled {
            self.toggle(&name);
        }
        if all {
            self.select_all(&names);
        }
        if none {
            self.clear();
        }
        if apply {
            return self
                .apply()
                .map(SelectorAction::Apply)
                .unwrap_or(SelectorAction::None);
        }
        if cancel {
            self.close();
            return SelectorAction::Close;
        }
        SelectorAction::None
    }
}
