pub const DEFAULT_SEARCH_LIMIT: usize = 10;

pub const MAJOR_CITIES: &[&str] = &[
    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix", "Philadelphia", "San Antonio", "San Diego", "Dallas", "San Jose",
    "Austin", "Jacksonville", "Fort Worth", "Columbus", "Charlotte", "San Francisco", "Indianapolis", "Seattle", "Denver", "Washington",
    "Boston", "El Paso", "Nashville", "Detroit", "Oklahoma City", "Portland", "Las Vegas", "Memphis", "Louisville", "Baltimore",
    "Milwaukee", "Albuquerque", "Tucson", "Fresno", "Sacramento", "Kansas City", "Long Beach", "Mesa", "Atlanta", "Colorado Springs",
    "Virginia Beach", "Raleigh", "Omaha", "Miami", "Oakland", "Minneapolis", "Tulsa", "Cleveland", "Wichita", "Arlington",
    "London", "Paris", "Berlin", "Madrid", "Rome", "Amsterdam", "Barcelona", "Vienna", "Prague", "Budapest",
    "Warsaw", "Stockholm", "Oslo", "Copenhagen", "Helsinki", "Dublin", "Brussels", "Zurich", "Geneva", "Milan",
    "Tokyo", "Seoul", "Beijing", "Shanghai", "Hong Kong", "Singapore", "Bangkok", "Mumbai", "Delhi", "Bangalore",
    "Sydney", "Melbourne", "Perth", "Brisbane", "Auckland", "Wellington",
    "Toronto", "Vancouver", "Montreal", "Calgary", "Ottawa", "Edmonton", "Winnipeg", "Quebec City",
    "Mexico City", "Guadalajara", "Monterrey", "Puebla", "Tijuana", "León", "Juárez", "Zapopan",
    "São Paulo", "Rio de Janeiro", "Salvador", "Brasília", "Fortaleza", "Belo Horizonte", "Manaus", "Curitiba",
    "Buenos Aires", "Córdoba", "Rosario", "Mendoza", "La Plata", "San Miguel de Tucumán",
    "Lima", "Arequipa", "Trujillo", "Chiclayo", "Piura", "Iquitos", "Cusco", "Chimbote",
    "Santiago", "Valparaíso", "Concepción", "La Serena", "Antofagasta", "Temuco",
    "Bogotá", "Medellín", "Cali", "Barranquilla", "Cartagena", "Cúcuta", "Bucaramanga", "Pereira",
    "Cairo", "Alexandria", "Giza", "Shubra El Kheima", "Port Said", "Suez",
    "Lagos", "Kano", "Ibadan", "Kaduna", "Port Harcourt", "Benin City",
    "Johannesburg", "Cape Town", "Durban", "Pretoria", "Port Elizabeth", "Bloemfontein",
    "Casablanca", "Rabat", "Fez", "Marrakech", "Agadir", "Tangier",
    "Nairobi", "Mombasa", "Nakuru", "Eldoret", "Kisumu", "Thika",
];

/// Case-insensitive substring search; prefix matches sort first, then
/// alphabetical.
pub fn search_cities(query: &str, limit: usize) -> Vec<&'static str> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(bool, String, &'static str)> = MAJOR_CITIES
        .iter()
        .filter_map(|&city| {
            let lower = city.to_lowercase();
            lower.contains(&q).then(|| (!lower.starts_with(&q), lower, city))
        })
        .collect();

    hits.sort();
    hits.into_iter().take(limit).map(|(_, _, city)| city).collect()
}
