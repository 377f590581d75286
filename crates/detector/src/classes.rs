//! COCO class table in the historical 91-slot layout.
//!
//! The gaps (`None` entries) are ids the dataset never assigned; they are
//! kept in place so class ids coming out of the model keep their original
//! meaning. Do not compact this table.

pub const NUM_CLASSES: usize = 91;

#[rustfmt::skip]
pub const COCO_CLASSES: [Option<&str>; NUM_CLASSES] = [
    None, Some("person"), Some("bicycle"), Some("car"), Some("motorcycle"),
    Some("airplane"), Some("bus"), Some("train"), Some("truck"), Some("boat"),
    Some("traffic light"), Some("fire hydrant"), None, Some("stop sign"),
    Some("parking meter"), Some("bench"), Some("bird"), Some("cat"),
    Some("dog"), Some("horse"), Some("sheep"), Some("cow"), Some("elephant"),
    Some("bear"), Some("zebra"), Some("giraffe"), None, Some("backpack"),
    Some("umbrella"), None, None, Some("handbag"), Some("tie"),
    Some("suitcase"), Some("frisbee"), Some("skis"), Some("snowboard"),
    Some("sports ball"), Some("kite"), Some("baseball bat"),
    Some("baseball glove"), Some("skateboard"), Some("surfboard"),
    Some("tennis racket"), Some("bottle"), None, Some("wine glass"),
    Some("cup"), Some("fork"), Some("knife"), Some("spoon"), Some("bowl"),
    Some("banana"), Some("apple"), Some("sandwich"), Some("orange"),
    Some("broccoli"), Some("carrot"), Some("hot dog"), Some("pizza"),
    Some("donut"), Some("cake"), Some("chair"), Some("couch"),
    Some("potted plant"), Some("bed"), None, Some("dining table"), None,
    None, Some("toilet"), None, Some("tv"), Some("laptop"), Some("mouse"),
    Some("remote"), Some("keyboard"), Some("cell phone"), Some("microwave"),
    Some("oven"), Some("toaster"), Some("sink"), Some("refrigerator"), None,
    Some("book"), Some("clock"), Some("vase"), Some("scissors"),
    Some("teddy bear"), Some("hair drier"), Some("toothbrush"),
];

/// Label for a class id.
///
/// Ids inside the table resolve to the table entry (`None` for the unused
/// slots); ids past the end get a synthesized `class_<id>` name so the id
/// is never silently lost.
pub fn class_label(class_id: usize) -> Option<String> {
    if class_id < COCO_CLASSES.len() {
        COCO_CLASSES[class_id].map(str::to_owned)
    } else {
        Some(format!("class_{class_id}"))
    }
}
