use crate::forecast::types::Advice;

/// Pick a message and clothing tip for the current conditions.
///
/// `temp_c` is the rounded Celsius reading; callers convert imperial
/// readings first.
pub fn advise(temp_c: i64, description: &str) -> Advice {
    let description = description.to_lowercase();

    let (message, mut tip) = if description.contains("rain") {
        (
            "It looks like a rainy day, don't forget your umbrella!",
            "Wear waterproof shoes and a raincoat.",
        )
    } else if description.contains("snow") {
        (
            "Snowy weather ahead. Dress warmly and drive safe!",
            "Wear boots, gloves, and a warm coat.",
        )
    } else if description.contains("clear") {
        let tip = if temp_c > 25 {
            "Stay hydrated and wear sunscreen."
        } else {
            "A light jacket should be enough."
        };
        ("It's a clear day. Enjoy the sunshine!", tip)
    } else if description.contains("cloud") {
        let tip = if temp_c < 15 {
            "Bring a sweater."
        } else {
            "Comfortable weather for a walk."
        };
        ("Cloudy skies today.", tip)
    } else {
        (
            "Check the weather before heading out!",
            "Dress appropriately for the conditions.",
        )
    };

    if temp_c < 5 {
        tip = "Bundle up, it's cold!";
    }
    if temp_c > 30 {
        tip = "It's hot! Wear light clothes and drink water.";
    }

    Advice {
        message: message.to_string(),
        tip: tip.to_string(),
    }
}
