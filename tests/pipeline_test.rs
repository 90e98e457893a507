mod common;

use common::test_utils::{MemoryFetcher, StubDecoder, binary_placement, make_texture};
use map_ngin::data_structures::draw_key::RenderLayer;
use map_ngin::error::ResolutionError;
use map_ngin::scene::{MapDesc, SceneBuilder};

fn city_desc() -> MapDesc {
    MapDesc {
        name: "testcity".to_string(),
        definition_paths: vec!["maps/props.def".to_string()],
        placement_paths: vec!["maps/props.pl".to_string()],
        zone_path: "maps/city.zon".to_string(),
        time_cycle_path: "data/cycle.dat".to_string(),
        model_dir: "models".to_string(),
        texture_dir: "textures".to_string(),
    }
}

fn time_cycle_rows() -> String {
    let mut text = String::new();
    for _ in 0..24 {
        text.push_str("40 40 60  0 0 0  120 160 250  200 210 230  0 0 0\n");
    }
    text
}

#[tokio::test]
async fn single_lamp_produces_one_opaque_batch() {
    let _ = env_logger::try_init();

    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        "maps/props.def",
        "objs\n100, lamp1, streetlights, 50.0, 0\nend\n",
    );
    fetcher.insert(
        "maps/props.pl",
        "inst\n100, lamp1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1\nend\n",
    );
    fetcher.insert(
        "maps/city.zon",
        "zone\ndowntown, 0, -10, -10, -10, 10, 10, 10, 1\nend\n",
    );
    fetcher.insert("data/cycle.dat", time_cycle_rows());
    fetcher.insert("models/lamp1.dff", b"mesh".to_vec());
    fetcher.insert("textures/streetlights.txd", b"txd".to_vec());

    let mut decoder = StubDecoder::new();
    decoder
        .model_textures
        .insert("lamp1".to_string(), "glow".to_string());
    decoder.dictionary_textures.push(make_texture("glow", 16, 16, 32));

    let mut builder = SceneBuilder::new(fetcher);
    let scene = builder.load_map(&city_desc(), &decoder).await.unwrap();

    assert_eq!(scene.batches.len(), 1);
    let batch = &scene.batches[0];
    assert_eq!(batch.key.zone, "downtown");
    assert_eq!(batch.key.layer, RenderLayer::Opaque);
    assert_eq!(batch.key.draw_distance, Some(50.0));
    assert_eq!(batch.key.time_window, None);
    assert_eq!(batch.instances.len(), 1);
    assert_eq!(batch.textures.iter().collect::<Vec<_>>(), ["glow"]);

    let atlas = scene.atlas.as_ref().expect("one texture was used");
    assert!(atlas.placements.contains_key("glow"));
    assert_eq!(scene.color_sets.len(), 24);
    assert!(scene.diagnostics.dropped.is_empty());
}

#[tokio::test]
async fn lod_stand_ins_are_excluded_except_the_named_exception() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        "maps/props.def",
        "objs\n\
         1, lamp1, streetlights, 50.0, 0\n\
         2, lodlamp1, streetlights, 300.0, 0\n\
         3, lodistancoast01, coast, 300.0, 0\n\
         end\n",
    );
    fetcher.insert(
        "maps/props.pl",
        "inst\n\
         1, lamp1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1\n\
         2, lodlamp1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1\n\
         3, lodistancoast01, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1\n\
         end\n",
    );
    fetcher.insert("maps/city.zon", "zone\nend\n");
    fetcher.insert("data/cycle.dat", time_cycle_rows());
    fetcher.insert("models/lamp1.dff", b"mesh".to_vec());
    fetcher.insert("models/lodistancoast01.dff", b"mesh".to_vec());
    fetcher.insert("textures/streetlights.txd", b"txd".to_vec());
    fetcher.insert("textures/coast.txd", b"txd".to_vec());

    let mut builder = SceneBuilder::new(fetcher);
    let scene = builder
        .load_map(&city_desc(), &StubDecoder::new())
        .await
        .unwrap();

    let placed: usize = scene.batches.iter().map(|b| b.instances.len()).sum();
    assert_eq!(placed, 2, "lamp plus the exception model");
    assert!(scene.diagnostics.dropped.is_empty());
}

#[tokio::test]
async fn binary_placements_resolve_by_id_and_suppress_lod_distance() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        "maps/props.def",
        "objs\n\
         7, kiosk, props, 60.0, 0\n\
         8, lodkiosk, props, 300.0, 0\n\
         end\n",
    );
    // Record 0 points at record 1 as its distant stand-in.
    fetcher.insert(
        "maps/props.pl",
        binary_placement(&[
            (1.0, 2.0, 3.0, [0.0, 0.0, 0.0, 1.0], 7, 0, 1),
            (1.0, 2.0, 3.0, [0.0, 0.0, 0.0, 1.0], 8, 0, -1),
        ]),
    );
    fetcher.insert("maps/city.zon", "zone\nend\n");
    fetcher.insert("data/cycle.dat", time_cycle_rows());
    fetcher.insert("models/kiosk.dff", b"mesh".to_vec());
    fetcher.insert("textures/props.txd", b"txd".to_vec());

    let mut builder = SceneBuilder::new(fetcher);
    let scene = builder
        .load_map(&city_desc(), &StubDecoder::new())
        .await
        .unwrap();

    assert_eq!(scene.batches.len(), 1);
    let batch = &scene.batches[0];
    assert_eq!(batch.instances.len(), 1);
    // The base model keeps rendering at any range.
    assert_eq!(batch.key.draw_distance, None);
    assert_eq!(batch.key.zone, "cityzon");
}

#[tokio::test]
async fn unresolved_instances_are_dropped_with_diagnostics() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        "maps/props.def",
        "objs\n1, lamp1, streetlights, 50.0, 0\nend\n",
    );
    fetcher.insert(
        "maps/props.pl",
        "inst\n\
         1, lamp1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1\n\
         9, ghost, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1\n\
         end\n",
    );
    fetcher.insert("maps/city.zon", "zone\nend\n");
    fetcher.insert("data/cycle.dat", time_cycle_rows());
    fetcher.insert("models/lamp1.dff", b"mesh".to_vec());
    fetcher.insert("textures/streetlights.txd", b"txd".to_vec());

    let mut builder = SceneBuilder::new(fetcher);
    let scene = builder
        .load_map(&city_desc(), &StubDecoder::new())
        .await
        .unwrap();

    assert_eq!(scene.batches.len(), 1);
    assert_eq!(scene.batches[0].instances.len(), 1);
    assert!(matches!(
        scene.diagnostics.dropped.as_slice(),
        [ResolutionError::UnknownModel(name)] if name == "ghost"
    ));
}

#[tokio::test]
async fn missing_textures_are_dropped_not_packed() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        "maps/props.def",
        "objs\n1, lamp1, streetlights, 50.0, 0\nend\n",
    );
    fetcher.insert(
        "maps/props.pl",
        "inst\n1, lamp1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1\nend\n",
    );
    fetcher.insert("maps/city.zon", "zone\nend\n");
    fetcher.insert("data/cycle.dat", time_cycle_rows());
    fetcher.insert("models/lamp1.dff", b"mesh".to_vec());
    fetcher.insert("textures/streetlights.txd", b"txd".to_vec());

    // The mesh samples "glow" but no dictionary provides it.
    let mut decoder = StubDecoder::new();
    decoder
        .model_textures
        .insert("lamp1".to_string(), "glow".to_string());

    let mut builder = SceneBuilder::new(fetcher);
    let scene = builder.load_map(&city_desc(), &decoder).await.unwrap();

    assert!(scene.atlas.is_none());
    assert!(matches!(
        scene.diagnostics.dropped.as_slice(),
        [ResolutionError::MissingTexture(name)] if name == "glow"
    ));
}

#[tokio::test]
async fn missing_map_file_aborts_the_load() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        "maps/props.def",
        "objs\n1, lamp1, streetlights, 50.0, 0\nend\n",
    );
    // No placement, zone or time-cycle files.

    let mut builder = SceneBuilder::new(fetcher);
    let result = builder.load_map(&city_desc(), &StubDecoder::new()).await;
    assert!(result.is_err());
}
