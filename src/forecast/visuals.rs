/// Icon and background gradient for a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visual {
    pub icon: &'static str,
    pub background: &'static str,
}

const DEFAULT_VISUAL: Visual = Visual {
    icon: "cloudy.svg",
    background: "from-gray-200 to-blue-300",
};

/// Look up the visual for an OpenWeather condition group (`weather[0].main`).
pub fn lookup(condition: &str) -> Visual {
    let (icon, background) = match condition {
        "Clear" => ("sunny.svg", "from-yellow-200 to-blue-400"),
        "Clouds" => ("cloudy.svg", "from-gray-300 to-blue-500"),
        "Rain" => ("rainy.svg", "from-blue-400 to-gray-600"),
        "Drizzle" => ("rainy.svg", "from-blue-300 to-gray-500"),
        "Thunderstorm" => ("storm.svg", "from-gray-700 to-blue-900"),
        "Snow" => ("snowy.svg", "from-blue-100 to-blue-400"),
        "Mist" => ("mist.svg", "from-gray-200 to-gray-400"),
        "Smoke" => ("mist.svg", "from-gray-300 to-gray-500"),
        "Haze" => ("mist.svg", "from-gray-200 to-yellow-200"),
        "Fog" => ("mist.svg", "from-gray-300 to-gray-500"),
        _ => return DEFAULT_VISUAL,
    };

    Visual { icon, background }
}

pub fn icon_for(condition: &str) -> &'static str {
    lookup(condition).icon
}
