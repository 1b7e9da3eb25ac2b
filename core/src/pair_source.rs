//! Symbol catalog and randomized pair layouts.
//!
//! A layout for `n` pairs is `n` distinct symbols drawn without
//! replacement, each placed twice, then uniformly shuffled. The catalog
//! is de-duplicated on construction so the pair invariant holds even
//! though some glyphs appear under more than one category.

use crate::{
    rng::{GameRng, RngBank, RngSlot},
    types::Symbol,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SymbolCategory {
    Animals,
    Food,
    Nature,
    Faces,
    Objects,
    Symbols,
}

impl SymbolCategory {
    pub const ALL: &'static [SymbolCategory] = &[
        Self::Animals,
        Self::Food,
        Self::Nature,
        Self::Faces,
        Self::Objects,
        Self::Symbols,
    ];

    pub fn symbols(&self) -> &'static [Symbol] {
        match self {
            Self::Animals => &[
                "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🦁",
                "🐯", "🐮", "🐷", "🐸", "🐵", "🐔", "🐧", "🐦", "🦅", "🦉",
                "🦇", "🐺", "🐗", "🐴", "🦄", "🐝", "🐛", "🦋", "🐌", "🐞",
            ],
            Self::Food => &[
                "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🫐", "🍈",
                "🍒", "🍑", "🥝", "🍍", "🥭", "🍆", "🥑", "🌽", "🌶️", "🍔",
                "🍕", "🌮", "🍣", "🍩", "🧁", "🍰", "🎂", "🍫", "🍬", "🍭",
            ],
            Self::Nature => &[
                "🌸", "🌻", "🌺", "🌹", "🌷", "🌵", "🎄", "🌿", "☘️", "🍀",
                "🍁", "🍂", "🌊", "🌈", "⭐", "🌙", "☀️", "⚡", "❄️", "🔥",
                "💧", "🌍", "🪨", "💎", "🌋", "🏔️", "🌾", "🍄", "🐚", "🪸",
            ],
            Self::Faces => &[
                "😀", "😂", "🥹", "😍", "🤩", "😎", "🥳", "😇", "🤠", "🤡",
                "👻", "💀", "👽", "🤖", "😺", "🙈", "🙉", "🙊", "💩", "🎃",
                "😈", "👹", "👺", "🫠", "🥶", "🥵", "🤯", "😴", "🤮", "🫣",
            ],
            Self::Objects => &[
                "🎮", "🎯", "🎲", "🧩", "🎪", "🎨", "🎸", "🥁", "🎹", "📷",
                "💡", "🔮", "⏰", "🧲", "🪄", "🎀", "🎁", "🏆", "🥇", "🎖️",
                "🗝️", "💰", "💎", "🧸", "🪆", "🎭", "🛸", "🚀", "⚽", "🏀",
            ],
            Self::Symbols => &[
                "❤️", "🧡", "💛", "💚", "💙", "💜", "🖤", "🤍", "💔", "❣️",
                "💕", "💞", "💓", "💗", "💖", "💘", "💝", "✨", "🌟", "💫",
                "⚡", "🔥", "🌀", "🎵", "🎶", "💥", "💢", "💣", "🃏", "♟️",
            ],
        }
    }
}

/// Distinct symbols of `categories`, in catalog order.
pub fn catalog(categories: &[SymbolCategory]) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = Vec::new();
    for category in categories {
        for &symbol in category.symbols() {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
    }
    symbols
}

pub struct PairSource {
    catalog: Vec<Symbol>,
    layout_rng: GameRng,
    decor_rng: GameRng,
}

impl PairSource {
    /// A source over the full catalog.
    pub fn new(bank: &RngBank) -> Self {
        Self::with_categories(bank, SymbolCategory::ALL)
    }

    /// A source restricted to `categories`. An empty selection falls
    /// back to the full catalog.
    pub fn with_categories(bank: &RngBank, categories: &[SymbolCategory]) -> Self {
        let categories = if categories.is_empty() {
            SymbolCategory::ALL
        } else {
            categories
        };
        Self {
            catalog: catalog(categories),
            layout_rng: bank.for_slot(RngSlot::Pairs),
            decor_rng: bank.for_slot(RngSlot::Decor),
        }
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    /// `2 * min(count, catalog_size)` symbols, each present exactly twice,
    /// in uniformly shuffled order.
    pub fn pairs(&mut self, count: usize) -> Vec<Symbol> {
        let n = count.min(self.catalog.len());
        if n < count {
            log::warn!(
                "pair source: requested {count} pairs, catalog holds {}; truncating",
                self.catalog.len()
            );
        }

        let selected: Vec<Symbol> = self
            .layout_rng
            .sample_indices(self.catalog.len(), n)
            .into_iter()
            .map(|i| self.catalog[i])
            .collect();

        let mut layout = Vec::with_capacity(n * 2);
        layout.extend_from_slice(&selected);
        layout.extend_from_slice(&selected);
        self.layout_rng.shuffle(&mut layout);
        layout
    }

    /// A single symbol for decorative use. Draws from its own stream.
    pub fn random_symbol(&mut self) -> Symbol {
        let i = self.decor_rng.below(self.catalog.len());
        self.catalog[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_catalog_drops_cross_category_duplicates() {
        let all = catalog(SymbolCategory::ALL);
        // ⚡, 🔥 and 💎 each sit in two categories.
        assert_eq!(all.len(), 177);
        for (i, symbol) in all.iter().enumerate() {
            assert!(
                !all[i + 1..].contains(symbol),
                "{symbol} appears more than once in the catalog"
            );
        }
    }

    #[test]
    fn every_category_holds_thirty_symbols() {
        for category in SymbolCategory::ALL {
            assert_eq!(category.symbols().len(), 30, "{category:?}");
        }
    }
}
