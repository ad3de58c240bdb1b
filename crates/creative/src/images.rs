//! Image briefs: one templated prompt per visual theme, sized to the policy.

use crate::types::{ImageBrief, ImageSpec};

/// Visual theme: (subject of the shot, why it tends to work).
struct Theme {
    subject: &'static str,
    why: &'static str,
}

const THEMES: [Theme; 8] = [
    Theme {
        subject: "a relaxed couple in their sixties reviewing bills at a kitchen table",
        why: "Relatable people in a familiar setting lift click-through for money-saving offers",
    },
    Theme {
        subject: "a close-up of a hand holding a smartphone showing a price comparison",
        why: "Product-in-hand shots make the action feel immediate and easy",
    },
    Theme {
        subject: "a bright, tidy living room with warm natural light",
        why: "Aspirational home interiors pair well with home and energy cover",
    },
    Theme {
        subject: "a family car parked on a suburban driveway at golden hour",
        why: "Everyday vehicles anchor motor insurance messaging without stock-photo gloss",
    },
    Theme {
        subject: "a simple flat-lay of a calculator, receipts and a coffee cup",
        why: "Clean still life signals budgeting and reads clearly at small sizes",
    },
    Theme {
        subject: "a smiling person giving a thumbs-up outside their front door",
        why: "Positive, direct-to-camera emotion increases trust and dwell time",
    },
    Theme {
        subject: "a before-and-after split of two utility bills with the lower one highlighted",
        why: "Visual contrast makes the savings claim concrete",
    },
    Theme {
        subject: "a calendar page with a renewal date circled in red",
        why: "Deadline cues reinforce urgency without shouting in the headline",
    },
];

/// Up to `cap` briefs, one per theme in a fixed order.
pub fn image_briefs(image: &ImageSpec, cap: usize) -> Vec<ImageBrief> {
    THEMES
        .iter()
        .take(cap)
        .map(|theme| ImageBrief {
            prompt: format!(
                "Photograph of {}, composed for a {} aspect ratio at {}, no overlaid text",
                theme.subject, image.aspect, image.recommended
            ),
            why: theme.why.to_string(),
        })
        .collect()
}
