use super::*;

fn photos(n: usize) -> Vec<Photo> {
    (0..n)
        .map(|i| Photo::new(format!("p{i}"), format!("https://cdn.example/{i}.jpg")))
        .collect()
}

fn kinds(plans: &[PagePlan]) -> Vec<LayoutKind> {
    content_pages(plans).iter().map(|p| p.kind).collect()
}

fn sizes(plans: &[PagePlan]) -> Vec<usize> {
    content_pages(plans)
        .iter()
        .map(|p| p.photo_ids.len())
        .collect()
}

#[test]
fn empty_input_is_cover_only() {
    let plans = plan(&[]);
    assert_eq!(plans.len(), 1);
    assert!(plans[0].is_cover());
    assert_eq!(plans[0].page_number(), None);
    assert!(content_pages(&plans).is_empty());
}

#[test]
fn single_photo_is_one_layout_c() {
    assert_eq!(kinds(&plan(&photos(1))), vec![LayoutKind::LayoutC]);
}

#[test]
fn two_photos_force_layout_a() {
    assert_eq!(kinds(&plan(&photos(2))), vec![LayoutKind::LayoutA]);
}

#[test]
fn six_photos_follow_the_pattern_exactly() {
    let plans = plan(&photos(6));
    assert_eq!(
        kinds(&plans),
        vec![LayoutKind::LayoutA, LayoutKind::LayoutB, LayoutKind::LayoutC]
    );
    assert_eq!(sizes(&plans), vec![2, 3, 1]);
}

#[test]
fn seven_photos_end_with_layout_c_not_half_b() {
    let plans = plan(&photos(7));
    assert_eq!(
        kinds(&plans),
        vec![
            LayoutKind::LayoutA,
            LayoutKind::LayoutB,
            LayoutKind::LayoutC,
            LayoutKind::LayoutC
        ]
    );
    assert_eq!(sizes(&plans), vec![2, 3, 1, 1]);
}

#[test]
fn other_remainders_degrade_to_single_pages() {
    // Turn B (3) with 2 left -> A; turn B with 1 left -> C.
    assert_eq!(sizes(&plan(&photos(4))), vec![2, 2]);
    assert_eq!(sizes(&plan(&photos(3))), vec![2, 1]);
    // Turn A (2) with 1 left -> C.
    assert_eq!(sizes(&plan(&photos(13))), vec![2, 3, 1, 2, 3, 1, 1]);
    assert_eq!(
        kinds(&plan(&photos(8))),
        vec![
            LayoutKind::LayoutA,
            LayoutKind::LayoutB,
            LayoutKind::LayoutC,
            LayoutKind::LayoutA
        ]
    );
}

#[test]
fn slices_reconstruct_input_for_many_lengths() {
    for n in 1..=40 {
        let input = photos(n);
        let plans = plan(&input);
        let mut rebuilt = Vec::new();
        let mut expected_start = 0;
        for page in content_pages(&plans) {
            assert_eq!(page.photo_range.start, expected_start, "gap at n={n}");
            assert_eq!(page.photo_ids.len(), page.kind.slots(), "n={n}");
            assert_eq!(
                page.photos(&input)
                    .iter()
                    .map(|p| p.id.clone())
                    .collect::<Vec<_>>(),
                page.photo_ids
            );
            expected_start = page.photo_range.end;
            rebuilt.extend(page.photo_ids.iter().cloned());
        }
        let original: Vec<_> = input.iter().map(|p| p.id.clone()).collect();
        assert_eq!(rebuilt, original, "n={n}");
    }
}

#[test]
fn page_numbers_are_contiguous_from_one() {
    let plans = plan(&photos(11));
    for (i, page) in plans.iter().enumerate() {
        assert_eq!(page.index, i);
    }
    let numbers: Vec<u32> = content_pages(&plans)
        .iter()
        .map(|p| p.page_number().unwrap())
        .collect();
    assert_eq!(numbers, (1..=numbers.len() as u32).collect::<Vec<_>>());
}

#[test]
fn planning_is_deterministic() {
    let input = photos(17);
    assert_eq!(plan(&input), plan(&input));
}
