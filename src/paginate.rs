use crate::duplex::back_page_order;
use crate::layout::Layout;
use crate::model::{Card, DisplayMode, Face};

/// A card as it appears on a planned page.
#[derive(Clone, Copy, Debug)]
pub struct PlacedCard<'a> {
    pub card: &'a Card,
    /// Index into the full card list.
    pub index: usize,
    /// Row-major grid slot on the page.
    pub slot: usize,
    pub face: Face,
}

#[derive(Clone, Debug)]
pub struct Page<'a> {
    pub index: usize,
    pub is_back: bool,
    /// Cards in drawing order (ascending slot).
    pub cards: Vec<PlacedCard<'a>>,
}

impl Page<'_> {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Splits a card list into pages for a given layout and display mode.
pub struct Pagination<'a> {
    cards: &'a [Card],
    layout: Layout,
    mode: DisplayMode,
}

impl<'a> Pagination<'a> {
    pub fn new(cards: &'a [Card], layout: &Layout, mode: DisplayMode) -> Self {
        Pagination { cards, layout: *layout, mode }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Pages needed to hold every card once. Zero when the layout has no
    /// capacity.
    pub fn basic_page_count(&self) -> usize {
        let cpp = self.layout.cards_per_page;
        if cpp == 0 {
            return 0;
        }
        self.cards.len().div_ceil(cpp)
    }

    pub fn total_page_count(&self) -> usize {
        match self.mode {
            DisplayMode::Duplex => self.basic_page_count() * 2,
            _ => self.basic_page_count(),
        }
    }

    pub fn is_back_page(&self, page_index: usize) -> bool {
        match self.mode {
            DisplayMode::Duplex => page_index % 2 == 1,
            DisplayMode::BackOnly => true,
            DisplayMode::FrontOnly | DisplayMode::Merged => false,
        }
    }

    /// The content page whose card slice `page_index` shows. In duplex mode
    /// both pages of a front/back pair share one content page.
    pub fn content_page(&self, page_index: usize) -> usize {
        match self.mode {
            DisplayMode::Duplex => page_index / 2,
            _ => page_index,
        }
    }

    /// The slice of cards shown on `page_index`, before any back-page
    /// reordering. Empty past the last page.
    pub fn cards_for_page(&self, page_index: usize) -> &'a [Card] {
        let cpp = self.layout.cards_per_page;
        let start = self.content_page(page_index).saturating_mul(cpp);
        if cpp == 0 || start >= self.cards.len() {
            return &[];
        }
        let end = (start + cpp).min(self.cards.len());
        &self.cards[start..end]
    }

    fn face_for(&self, is_back: bool, index: usize) -> Face {
        let back = match self.mode {
            DisplayMode::Merged => index % 2 == 1,
            _ => is_back,
        };
        if back { Face::Back } else { Face::Front }
    }

    pub fn page(&self, page_index: usize) -> Option<Page<'a>> {
        if page_index >= self.total_page_count() {
            return None;
        }
        let is_back = self.is_back_page(page_index);
        let slice = self.cards_for_page(page_index);
        let first = self.content_page(page_index) * self.layout.cards_per_page;

        let cards = if is_back && self.mode == DisplayMode::Duplex {
            back_page_order(
                slice.len(),
                self.layout.cards_per_row,
                self.layout.cards_per_column,
                self.layout.flip_direction,
            )
            .into_iter()
            .map(|p| PlacedCard {
                card: &slice[p.source],
                index: first + p.source,
                slot: p.slot,
                face: Face::Back,
            })
            .collect()
        } else {
            slice
                .iter()
                .enumerate()
                .map(|(i, card)| PlacedCard {
                    card,
                    index: first + i,
                    slot: i,
                    face: self.face_for(is_back, first + i),
                })
                .collect()
        };

        Some(Page { index: page_index, is_back, cards })
    }

    pub fn pages(&self) -> impl Iterator<Item = Page<'a>> + '_ {
        (0..self.total_page_count()).filter_map(|i| self.page(i))
    }
}
