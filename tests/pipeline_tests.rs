//! End-to-end tests of the generation pipeline against fixture data

mod common;

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tooltipgen::frames::{self, FrameLayout};
use tooltipgen::generated::GeneratedObject;
use tooltipgen::inventory::{render_inventory, InventoryLayout, InventoryRequest};
use tooltipgen::item::{parse_item, DialectKind};
use tooltipgen::pipeline::{render_tooltip, GenerationRequest, Generator, HeadRequest, TooltipRequest};
use tooltipgen::rarity::Rarity;
use tooltipgen::sprite::effects::{draw_durability_bar, durability_fill};
use tooltipgen::sprite::ItemRequest;
use tooltipgen::templates::TemplateEngine;
use tooltipgen::text::{visible_length, wrap_string};
use tooltipgen::worker::CancelToken;
use tooltipgen::{Context, GeneratorError};

use common::{digest, fixture, Fixture, GLINT_FRAMES, SKIN_HASH};

fn generator(fixture: &Fixture) -> Generator {
    let context = Context::from_config_path(Some(&fixture.config_path)).expect("fixture context");
    Generator::new(Arc::new(context)).expect("generator")
}

#[test]
fn test_static_render_is_deterministic() {
    let fixture = fixture();
    let generator = generator(&fixture);
    let requests = || {
        vec![
            GenerationRequest::Item(ItemRequest { big_image: true, ..ItemRequest::new("diamond_sword") }),
            GenerationRequest::Tooltip(TooltipRequest {
                name: Some("Aspect of the End".into()),
                lore: "%%DAMAGE:100%%\n%%STRENGTH:100%%\n\n&7Teleport &a8 blocks &7ahead.".into(),
                rarity: Rarity::by_name("RARE"),
                item_type: Some("SWORD".into()),
                ..TooltipRequest::default()
            }),
        ]
    };

    let first = generator.generate(requests()).unwrap();
    let second = generator.generate(requests()).unwrap();
    assert!(!first.is_animated());
    assert_eq!(digest(&first.preview), digest(&second.preview));
}

#[test]
fn test_enchanted_sword_end_to_end() {
    let fixture = fixture();
    let generator = generator(&fixture);
    let sword = ItemRequest { enchanted: true, big_image: true, ..ItemRequest::new("diamond_sword") };

    let output = generator
        .generate(vec![
            GenerationRequest::Item(sword.clone()),
            GenerationRequest::Tooltip(TooltipRequest::lore("%%HEALTH:100%%")),
        ])
        .unwrap();

    assert!(output.is_animated());
    assert_eq!(output.frame_count, GLINT_FRAMES);
    assert_eq!(output.delay_ms, Some(33));
    let gif = output.gif.as_ref().unwrap();
    assert_eq!(&gif[..6], b"GIF89a");

    // Frame 0: glint pass 0 of the sword next to the expanded tooltip
    let context = generator.context();
    let sprite = context.sprite_compositor().render_item(&sword).unwrap();
    let tooltip = render_tooltip(context, &TooltipRequest::lore("&7Health: &c100&r")).unwrap();
    let expected = frames::compose_frame(&[sprite.frame(0), tooltip.preview()], &FrameLayout::default());
    assert_eq!(digest(&output.preview), digest(&expected));
}

fn shaded(count: u8, delay_ms: u32) -> GeneratedObject {
    let frames = (0..count).map(|i| RgbaImage::from_pixel(4, 4, Rgba([i * 20 + 10, 0, 0, 255]))).collect();
    GeneratedObject::animated(frames, delay_ms).unwrap()
}

#[test]
fn test_frames_reuse_modulo_own_count() {
    let layout = FrameLayout { object_padding: 2, border_padding: 0 };
    let still = GeneratedObject::still(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
    let objects = vec![shaded(3, 0), still, shaded(4, 60)];

    let composed = frames::compose(&objects, &layout, &CancelToken::new()).unwrap();
    assert_eq!(composed.frame_count(), 4);
    assert_eq!(composed.delay_ms(), Some(60));

    for i in 0..4 {
        let frame = composed.frame(i);
        assert_eq!(frame.get_pixel(0, 0)[0], (i % 3) as u8 * 20 + 10, "first object, frame {}", i);
        assert_eq!(frame.get_pixel(6, 0), &Rgba([0, 0, 255, 255]), "static object, frame {}", i);
        assert_eq!(frame.get_pixel(12, 0)[0], i as u8 * 20 + 10, "last object, frame {}", i);
    }
}

#[test]
fn test_mapped_overlay_unknown_key_matches_uncolored() {
    let fixture = fixture();
    let context = Context::from_config_path(Some(&fixture.config_path)).unwrap();
    let compositor = context.sprite_compositor();

    let plain = compositor.render_item(&ItemRequest::new("potion")).unwrap();
    let unknown = compositor
        .render_item(&ItemRequest { color: Some("not-a-color".into()), ..ItemRequest::new("potion") })
        .unwrap();
    let red = compositor.render_item(&ItemRequest { color: Some("red".into()), ..ItemRequest::new("potion") }).unwrap();

    assert_eq!(digest(plain.preview()), digest(unknown.preview()));
    assert_ne!(digest(plain.preview()), digest(red.preview()));
}

#[test]
fn test_durability_fill_is_monotonic() {
    let mut previous = 0;
    for percent in 0..=100u8 {
        let fill = durability_fill(160, percent);
        assert!(fill >= previous, "fill shrank at {}%", percent);
        previous = fill;
    }
    assert_eq!(durability_fill(160, 0), 0);

    let sprite = RgbaImage::from_pixel(16, 16, Rgba([10, 10, 10, 255]));
    assert_eq!(draw_durability_bar(&sprite, 100), sprite);
    assert_ne!(draw_durability_bar(&sprite, 40), sprite);
}

#[test]
fn test_out_of_range_durability_rejected() {
    let fixture = fixture();
    let generator = generator(&fixture);
    let result = generator.generate(vec![GenerationRequest::Item(ItemRequest {
        durability: Some(101),
        ..ItemRequest::new("diamond_sword")
    })]);
    assert!(matches!(result, Err(GeneratorError::InvalidInput(_))));
}

#[test]
fn test_player_head_from_skin_directory() {
    let fixture = fixture();
    let generator = generator(&fixture);
    let output = generator
        .generate(vec![GenerationRequest::Head(HeadRequest { skin: SKIN_HASH.to_uppercase(), big_image: false })])
        .unwrap();
    // 8px face at scale 2 inside the 15px border
    assert_eq!(output.preview.dimensions(), (16 + 30, 16 + 30));
    assert_eq!(output.preview.get_pixel(15 + 8, 15 + 15), &Rgba([200, 150, 120, 255]));
    assert_eq!(output.preview.get_pixel(15, 15), &Rgba([60, 40, 20, 255]));
}

#[test]
fn test_item_metadata_to_image() {
    let fixture = fixture();
    let generator = generator(&fixture);
    let json = r#"{
        "id": "minecraft:leather_chestplate",
        "components": {
            "minecraft:custom_name": {"text": "Tunic", "color": "green"},
            "minecraft:lore": ["{\"text\":\"Defense: \",\"color\":\"gray\",\"extra\":[{\"text\":\"+20\",\"color\":\"green\"}]}"],
            "minecraft:dyed_color": {"rgb": 16711680}
        },
        "tag": {"display": {"Name": "ignored"}}
    }"#;

    let parsed = parse_item(json, generator.context().templates()).unwrap();
    assert_eq!(parsed.dialect, DialectKind::Components);
    assert_eq!(parsed.name.as_deref(), Some("&aTunic"));
    assert_eq!(parsed.lore, "%%DEFENSE:+20%%");
    assert_eq!(parsed.dye_color.as_deref(), Some("#FF0000"));

    let output = generator.generate_item(&parsed, Rarity::by_name("EPIC")).unwrap();
    assert!(!output.is_animated());
    assert!(output.preview.width() > 160 + 25 + 30);
}

#[test]
fn test_inventory_with_hovered_tooltip() {
    let fixture = fixture();
    let generator = generator(&fixture);
    let contents = format!("diamond_sword,enchanted:1%%potion,red:2,3%%player_head,skin={}:3%%null:4", SKIN_HASH);
    let inventory = InventoryRequest { title: Some("&6Loot".into()), ..InventoryRequest::new(1, 4, contents) };

    let output = generator
        .generate(vec![
            GenerationRequest::Inventory(inventory.clone()),
            GenerationRequest::Tooltip(TooltipRequest::lore("&aHovered")),
        ])
        .unwrap();
    assert!(output.is_animated());
    assert_eq!(output.frame_count, GLINT_FRAMES);

    let context = generator.context();
    let grid = render_inventory(context, &inventory).unwrap();
    let layout = InventoryLayout::new(&inventory);
    assert_eq!(grid.dimensions(), (layout.width, layout.height));
    let tooltip = render_tooltip(context, &TooltipRequest::lore("&aHovered")).unwrap();
    let expected = frames::compose_frame(&[grid.frame(0), tooltip.preview()], &FrameLayout::default());
    assert_eq!(digest(&output.preview), digest(&expected));

    // "red" is a known color option, so the potion liquid is tinted
    assert_eq!(context.overlays().all_option_names(), vec!["red"]);
    let red = context
        .sprite_compositor()
        .render_item(&ItemRequest { color: Some("red".into()), ..ItemRequest::new("potion") })
        .unwrap();
    let (x, y) = layout.slot_origin(2);
    let inset = layout.unit;
    let placed = grid.preview().get_pixel((x + inset) as u32 + 12, (y + inset) as u32 + 14);
    assert_eq!(placed, red.preview().get_pixel(6, 7));

    // Title drawn without its color codes in the header
    let title_color = Rgba([63, 63, 63, 255]);
    let header = layout.header as u32;
    assert!((0..layout.width).any(|x| (0..header).any(|y| *grid.preview().get_pixel(x, y) == title_color)));
}

#[test]
fn test_reverse_is_case_insensitive() {
    let templates = TemplateEngine::new().unwrap();
    assert_eq!(templates.reverse("§7HEALTH: §c100§r"), "%%HEALTH:100%%");
}

#[test]
fn test_wrapped_lines_respect_length_and_carry_color() {
    let text = "&aalpha beta gamma delta epsilon zeta eta theta iota kappa";
    let lines = wrap_string(text, 12);
    assert!(lines.len() > 1);
    for line in &lines {
        assert!(visible_length(line) <= 12, "line too long: {:?}", line);
        assert!(line.starts_with("&a"), "color lost: {:?}", line);
    }
}
