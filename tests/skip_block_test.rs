// Test block suppression against the bundled page layout

use mapboxgl_viz::templates::skip_block::{filter_source, tokenize, SkipBlockFilter};
use mapboxgl_viz::templates::{BundledTemplate, SkipBlocks, MAIN_BLOCKS};

#[test]
fn test_upper_block_removed_lower_block_untouched() {
    let source = concat!(
        "{{#block \"upper_main_block\"}}<head>upper</head>{{/block}}\n",
        "{{#block \"lower_main_block\"}}<footer>lower {{div_id}}</footer>{{/block}}\n",
    );
    let skip: SkipBlocks = ["upper_main_block"].into_iter().collect();

    let out = filter_source(source, &skip).unwrap();

    assert!(!out.contains("upper"));
    assert!(out.contains("{{#block \"lower_main_block\"}}<footer>lower {{div_id}}</footer>{{/block}}"));
}

#[test]
fn test_child_view_of_main_layout() {
    let main = BundledTemplate::Main.content();
    let out = filter_source(main, &SkipBlocks::main_blocks()).unwrap();

    for block in MAIN_BLOCKS {
        assert!(!out.contains(block), "{} should be removed", block);
    }
    assert!(!out.contains("<!DOCTYPE html>"));
    assert!(!out.contains("</html>"));
    assert!(out.contains("{{> @partial-block}}"));
    assert!(out.contains("{{#each child_layers}}"));
}

#[test]
fn test_filter_is_identity_without_skips() {
    for template in BundledTemplate::ALL {
        let source = template.content();
        assert_eq!(filter_source(source, &SkipBlocks::new()).unwrap(), source);
    }
}

#[test]
fn test_filter_streams_tokens() {
    let source = "a{{#block \"x\"}}b{{/block}}c";
    let tokens = tokenize(source).unwrap();
    let skip: SkipBlocks = ["x"].into_iter().collect();

    let kept: Vec<&str> = SkipBlockFilter::new(&tokens, &skip).map(|t| t.text).collect();

    assert_eq!(kept, vec!["a", "c"]);
}

#[test]
fn test_unrelated_skip_names_leave_layout_intact() {
    let main = BundledTemplate::Main.content();
    let skip: SkipBlocks = ["not_a_block"].into_iter().collect();
    assert_eq!(filter_source(main, &skip).unwrap(), main);
}
