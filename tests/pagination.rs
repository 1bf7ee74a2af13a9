mod common;

use std::collections::HashSet;

use cardsheet::{
    CardSize, Dimensions, DisplayMode, Face, FlipDirection, Layout, Pagination, PrintConfig,
};

fn layout(flip: FlipDirection) -> Layout {
    Layout::compute(&PrintConfig { flip_direction: flip, ..PrintConfig::default() })
}

#[test]
fn thirteen_cards_make_three_pages() {
    let cards = common::cards(13);
    let l = layout(FlipDirection::LongEdge);
    assert_eq!(l.cards_per_page, 6);
    let p = Pagination::new(&cards, &l, DisplayMode::FrontOnly);
    assert_eq!(p.basic_page_count(), 3);
    assert_eq!(p.total_page_count(), 3);
    let sizes: Vec<usize> = p.pages().map(|page| page.len()).collect();
    assert_eq!(sizes, vec![6, 6, 1]);
    assert!(p.pages().all(|page| !page.is_back));
    assert_eq!(p.cards_for_page(2)[0].id, "c12");
    assert!(p.cards_for_page(3).is_empty());
    assert!(p.page(3).is_none());
}

#[test]
fn duplex_doubles_pages_and_pairs_share_cards() {
    let cards = common::cards(13);
    let l = layout(FlipDirection::LongEdge);
    let p = Pagination::new(&cards, &l, DisplayMode::Duplex);
    assert_eq!(p.basic_page_count(), 3);
    assert_eq!(p.total_page_count(), 6);

    for k in 0..3 {
        let front = p.page(2 * k).unwrap();
        let back = p.page(2 * k + 1).unwrap();
        assert!(!front.is_back);
        assert!(back.is_back);
        assert_eq!(p.content_page(2 * k), k);
        assert_eq!(p.content_page(2 * k + 1), k);
        assert_eq!(p.cards_for_page(2 * k), p.cards_for_page(2 * k + 1));

        let front_ids: HashSet<&str> = front.cards.iter().map(|c| c.card.id.as_str()).collect();
        let back_ids: HashSet<&str> = back.cards.iter().map(|c| c.card.id.as_str()).collect();
        assert_eq!(front_ids, back_ids);
        assert!(front.cards.iter().all(|c| c.face == Face::Front));
        assert!(back.cards.iter().all(|c| c.face == Face::Back));
    }
}

#[test]
fn pages_cover_every_card_exactly_once() {
    let l = layout(FlipDirection::LongEdge);
    for n in [0usize, 1, 5, 6, 7, 12, 13, 60, 61] {
        let cards = common::cards(n);
        for mode in [DisplayMode::FrontOnly, DisplayMode::BackOnly, DisplayMode::Merged] {
            let p = Pagination::new(&cards, &l, mode);
            let seen: Vec<usize> = p.pages().flat_map(|page| page.cards).map(|c| c.index).collect();
            assert_eq!(seen, (0..n).collect::<Vec<_>>(), "n={n} mode={mode:?}");
        }

        // Duplex: the front pages alone cover the list; backs repeat them.
        let p = Pagination::new(&cards, &l, DisplayMode::Duplex);
        let fronts: Vec<usize> = p
            .pages()
            .filter(|page| !page.is_back)
            .flat_map(|page| page.cards)
            .map(|c| c.index)
            .collect();
        assert_eq!(fronts, (0..n).collect::<Vec<_>>(), "duplex n={n}");
        let mut backs: Vec<usize> = p
            .pages()
            .filter(|page| page.is_back)
            .flat_map(|page| page.cards)
            .map(|c| c.index)
            .collect();
        backs.sort();
        assert_eq!(backs, fronts);
    }
}

#[test]
fn back_only_shows_backs_everywhere() {
    let cards = common::cards(7);
    let l = layout(FlipDirection::LongEdge);
    let p = Pagination::new(&cards, &l, DisplayMode::BackOnly);
    assert_eq!(p.total_page_count(), 2);
    for page in p.pages() {
        assert!(page.is_back);
        // Not duplex: no reordering, slots follow the list.
        let slots: Vec<usize> = page.cards.iter().map(|c| c.slot).collect();
        assert_eq!(slots, (0..page.len()).collect::<Vec<_>>());
        assert!(page.cards.iter().all(|c| c.face == Face::Back));
    }
}

#[test]
fn merged_alternates_faces_by_global_index() {
    let cards = common::cards(9);
    let l = layout(FlipDirection::LongEdge);
    let p = Pagination::new(&cards, &l, DisplayMode::Merged);
    let faces: Vec<Face> = p.pages().flat_map(|page| page.cards).map(|c| c.face).collect();
    for (i, face) in faces.iter().enumerate() {
        let expected = if i % 2 == 1 { Face::Back } else { Face::Front };
        assert_eq!(*face, expected, "card {i}");
    }
}

#[test]
fn zero_capacity_yields_no_pages() {
    let cards = common::cards(4);
    let config = PrintConfig {
        card_size: CardSize::Custom,
        custom_card_size: Dimensions { width: 300.0, height: 400.0 },
        ..PrintConfig::default()
    };
    let l = Layout::compute(&config);
    for mode in [DisplayMode::FrontOnly, DisplayMode::Duplex] {
        let p = Pagination::new(&cards, &l, mode);
        assert_eq!(p.basic_page_count(), 0);
        assert_eq!(p.total_page_count(), 0);
        assert!(p.cards_for_page(0).is_empty());
        assert_eq!(p.pages().count(), 0);
    }
}

#[test]
fn duplex_back_of_partial_page_uses_mirrored_slots() {
    // 2 columns x 3 rows; the last content page holds c6 only.
    let cards = common::cards(7);
    let l = layout(FlipDirection::LongEdge);
    let p = Pagination::new(&cards, &l, DisplayMode::Duplex);
    let back = p.page(3).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back.cards[0].card.id, "c6");
    assert_eq!(back.cards[0].index, 6);
    // Front slot 0 (row 0, col 0) lands on row 2, col 0.
    assert_eq!(back.cards[0].slot, 4);
}
