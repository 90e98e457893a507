mod common;

use common::test_utils::make_texture;
use map_ngin::atlas::{
    TEXTURE_ARRAY_CAPACITY, atlas_width_for_area, pack_atlas, pack_texture_arrays,
};

#[test]
fn width_follows_total_area() {
    // sqrt(1,000,000) = 1000 rounds up to 1024.
    assert_eq!(atlas_width_for_area(1_000_000), 1024);
    // sqrt(10,000,000) rounds up past 2048 and clamps.
    assert_eq!(atlas_width_for_area(10_000_000), 2048);
    assert_eq!(atlas_width_for_area(1), 1);
}

#[test]
fn placements_never_overlap_and_stay_in_bounds() {
    let textures = vec![
        make_texture("grass", 64, 64, 32),
        make_texture("wall_a", 128, 64, 24),
        make_texture("wall_b", 128, 64, 24),
        make_texture("door", 32, 96, 32),
        make_texture("sky", 256, 128, 24),
        make_texture("dot", 8, 8, 32),
    ];
    let atlas = pack_atlas(&textures);
    assert_eq!(atlas.placements.len(), textures.len());
    assert_eq!(
        atlas.pixels.len(),
        atlas.width as usize * atlas.height as usize * 4
    );

    let rects: Vec<_> = atlas.placements.values().collect();
    for at in &rects {
        assert!(at.x + at.width <= atlas.width);
        assert!(at.y + at.height <= atlas.height);
    }
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            let disjoint = a.x + a.width <= b.x
                || b.x + b.width <= a.x
                || a.y + a.height <= b.y
                || b.y + b.height <= a.y;
            assert!(disjoint, "overlap between {a:?} and {b:?}");
        }
    }
}

#[test]
fn layout_is_deterministic_under_input_order() {
    let mut textures = vec![
        make_texture("a", 64, 64, 32),
        make_texture("b", 64, 64, 32),
        make_texture("c", 32, 64, 24),
    ];
    let first = pack_atlas(&textures);
    textures.reverse();
    let second = pack_atlas(&textures);
    for (name, at) in &first.placements {
        assert_eq!(second.placements[name], *at);
    }
    // Same height ties break by width, then reverse name order.
    assert!(first.placements["b"].x < first.placements["a"].x);
}

#[test]
fn rgb_sources_get_opaque_alpha() {
    let atlas = pack_atlas(&[make_texture("solid", 4, 4, 24)]);
    let at = atlas.placements["solid"];
    for y in 0..4 {
        for x in 0..4 {
            let i = (((at.y + y) * atlas.width + at.x + x) as usize) * 4;
            assert_eq!(atlas.pixels[i + 3], 0xff);
        }
    }

    let atlas = pack_atlas(&[make_texture("glassy", 4, 4, 32)]);
    let at = atlas.placements["glassy"];
    let i = ((at.y * atlas.width + at.x) as usize) * 4;
    assert_eq!(atlas.pixels[i + 3], 0x80);
}

#[test]
fn atlas_converts_to_image() {
    let atlas = pack_atlas(&[make_texture("tile", 16, 16, 32)]);
    let image = atlas.to_image();
    assert_eq!(image.dimensions(), (atlas.width, atlas.height));
}

#[test]
#[should_panic(expected = "empty texture set")]
fn empty_set_is_a_precondition_violation() {
    pack_atlas(&[]);
}

#[test]
fn arrays_group_by_signature_and_spill_at_capacity() {
    let mut textures = Vec::new();
    for i in 0..TEXTURE_ARRAY_CAPACITY + 3 {
        textures.push(make_texture(&format!("small{i:03}"), 16, 16, 32));
    }
    textures.push(make_texture("big", 64, 64, 32));
    textures.push(make_texture("flat", 16, 16, 24));

    let (arrays, placements) = pack_texture_arrays(&textures);
    // 16x16x32 spills into two shards; 16x16x24 and 64x64x32 get their own.
    assert_eq!(arrays.len(), 4);
    assert_eq!(placements.len(), textures.len());

    let spilled: Vec<_> = arrays
        .iter()
        .filter(|a| a.signature.width == 16 && a.signature.depth == 32)
        .collect();
    assert_eq!(spilled.len(), 2);
    assert_eq!(spilled[0].layers as usize, TEXTURE_ARRAY_CAPACITY);
    assert_eq!(spilled[1].layers, 3);

    for (name, at) in &placements {
        assert_eq!((at.x, at.y), (0, 0));
        let array = &arrays[at.index as usize];
        assert!(at.layer < array.layers, "{name} layer out of range");
        assert_eq!(at.width, array.signature.width);
    }
}
