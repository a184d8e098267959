//! Canned-template response drafting.
//!
//! Ratings bucket into positive (>=4), neutral (=3), and negative (<=2); one
//! of three templates per bucket is chosen uniformly at random, the business
//! name substituted, and the requested tone applied as a text transform.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DraftRequest, GeneratorError, ResponseGenerator, Tone};

const POSITIVE_TEMPLATES: [&str; 3] = [
    "Thank you so much for your wonderful review! We're thrilled to hear that you had such a positive experience with {business}. Your feedback means the world to us and motivates our team to continue providing excellent service. We look forward to serving you again soon!",
    "We're absolutely delighted by your {rating}-star review! It's fantastic to know that we exceeded your expectations. At {business}, we're committed to delivering exceptional experiences, and your kind words confirm we're on the right track. Thank you for choosing us!",
    "Your glowing review has made our day! We're so pleased that you enjoyed your experience with {business}. Our team works hard to provide outstanding service, and it's incredibly rewarding to see that reflected in your feedback. We can't wait to welcome you back!",
];

const NEUTRAL_TEMPLATES: [&str; 3] = [
    "Thank you for taking the time to share your feedback about {business}. We appreciate your honest review and are always looking for ways to improve our service. We'd love the opportunity to exceed your expectations on your next visit. Please don't hesitate to reach out if there's anything specific we can do better.",
    "We appreciate your review and are glad you chose {business}. While we're pleased you had a decent experience, we're always striving to do better. Your feedback helps us identify areas for improvement. We hope to have the chance to provide you with an even better experience next time!",
    "Thank you for your feedback about your experience with {business}. We value all reviews as they help us grow and improve. We'd welcome the opportunity to discuss your visit further and show you the improvements we've been making. Please feel free to contact us directly.",
];

const NEGATIVE_TEMPLATES: [&str; 3] = [
    "Thank you for bringing your concerns to our attention. We sincerely apologize that your experience with {business} didn't meet your expectations. Your feedback is invaluable in helping us improve our service. We'd appreciate the opportunity to discuss this further and make things right. Please contact us directly so we can address your concerns properly.",
    "We're truly sorry to hear about your disappointing experience at {business}. This is not the level of service we strive to provide, and we take your feedback very seriously. We'd like to learn more about what went wrong and work to resolve this issue. Please reach out to us directly so we can make this right.",
    "We apologize for falling short of your expectations during your visit to {business}. Your feedback is crucial for our improvement, and we're committed to addressing the issues you've raised. We'd value the opportunity to speak with you directly to understand how we can do better and regain your trust.",
];

const CASUAL_EMOJI: &str = "\u{1F60A}";
const FRIENDLY_CLOSING: &str = " Have a wonderful day!";

/// Contraction pairs for the formal/casual transforms, both sentence-initial
/// and mid-sentence forms.
const CONTRACTIONS: [(&str, &str); 6] = [
    ("We're", "We are"),
    ("we're", "we are"),
    ("Can't", "Cannot"),
    ("can't", "cannot"),
    ("Don't", "Do not"),
    ("don't", "do not"),
];

pub struct TemplateResponder {
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl TemplateResponder {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            latency: Duration::from_millis(latency_ms),
        }
    }

    /// Deterministic template selection for tests.
    pub fn with_seed(seed: u64, latency_ms: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: Duration::from_millis(latency_ms),
        }
    }

    fn pick(&self, len: usize) -> usize {
        self.rng.lock().expect("rng lock").gen_range(0..len)
    }
}

fn templates_for(rating: i64) -> &'static [&'static str; 3] {
    if rating >= 4 {
        &POSITIVE_TEMPLATES
    } else if rating == 3 {
        &NEUTRAL_TEMPLATES
    } else {
        &NEGATIVE_TEMPLATES
    }
}

fn substitute(template: &str, request: &DraftRequest) -> String {
    template
        .replace("{business}", &request.business_name)
        .replace("{rating}", &request.rating.to_string())
}

fn apply_tone(mut response: String, tone: Tone) -> String {
    match tone {
        Tone::Professional => response,
        Tone::Formal => {
            for (contracted, expanded) in CONTRACTIONS {
                response = response.replace(contracted, expanded);
            }
            response
        }
        Tone::Casual => {
            for (contracted, expanded) in CONTRACTIONS {
                response = response.replace(expanded, contracted);
            }
            response.push(' ');
            response.push_str(CASUAL_EMOJI);
            response
        }
        Tone::Friendly => {
            response.push_str(FRIENDLY_CLOSING);
            response
        }
    }
}

#[async_trait]
impl ResponseGenerator for TemplateResponder {
    async fn generate(&self, request: &DraftRequest) -> Result<String, GeneratorError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let templates = templates_for(request.rating);
        let template = templates[self.pick(templates.len())];

        let mut response = apply_tone(substitute(template, request), request.tone);

        if let Some(instructions) = &request.custom_instructions {
            response.push_str("\n\n");
            response.push_str(instructions);
        }

        Ok(response)
    }
}
