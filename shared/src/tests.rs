#[cfg(test)]
mod tests {
    use crate::cities::{search_cities, DEFAULT_SEARCH_LIMIT};
    use crate::error::{ErrorCode, ErrorResponse};
    use crate::fans::{demo_fans, fans_to_points, merge_fans, CityFan};
    use crate::models::*;
    use crate::validation::*;

    fn vote(city: &str, email: &str) -> VoteRequest {
        VoteRequest { city: city.into(), email: email.into(), consent: false }
    }

    #[test]
    fn test_city_normalization() {
        for raw in ["new   york", "New York", " NEW YORK ", "new\tyork\n"] {
            assert_eq!(normalize_city_name(raw), "New York");
        }
        assert_eq!(normalize_city_name("  los   angeles "), "Los Angeles");
        assert_eq!(normalize_city_name("winston-salem"), "Winston-Salem");
        assert_eq!(normalize_city_name("são paulo"), "São Paulo");
    }

    #[test]
    fn test_city_validation() {
        assert_eq!(validate_city(" denver "), Ok("Denver".into()));
        assert_eq!(validate_city("a"), Err(ValidationError::CityTooShort));
        assert_eq!(validate_city("   x   "), Err(ValidationError::CityTooShort));
        assert_eq!(validate_city("12345"), Err(ValidationError::CityWithoutLetter));
        assert_eq!(validate_city(&"a".repeat(MAX_CITY_LENGTH + 1)), Err(ValidationError::CityTooLong));
        assert!(validate_city(&"a".repeat(MAX_CITY_LENGTH)).is_ok());
        assert!(matches!(validate_city("fuck"), Err(ValidationError::InappropriateCity(_))));
    }

    #[test]
    fn test_email_validation() {
        assert_eq!(validate_email(" A@X.com "), Ok("a@x.com".into()));
        for bad in ["", "plain", "@x.com", "a@x", "a@.com", "a@x.", "a b@x.com", "a@b@x.com"] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
        let long = format!("{}@x.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(validate_email(&long), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_vote_request_validation() {
        assert_eq!(
            validate_vote_request(&vote("  los   angeles ", "B@X.com")),
            Ok(("Los Angeles".into(), "b@x.com".into()))
        );
        assert!(matches!(validate_vote_request(&vote("!!", "a@x.com")), Err(ValidationError::CityWithoutLetter)));
        assert!(matches!(validate_vote_request(&vote("Paris", "nope")), Err(ValidationError::InvalidEmail)));
        assert!(matches!(
            validate_vote_request(&vote("fuck", "a@x.com")),
            Err(ValidationError::InappropriateCity(_))
        ));
    }

    #[test]
    fn test_heat_point_request() {
        let coords = HeatPointRequest { lat: Some(10.0), lng: Some(20.0), ..Default::default() };
        assert!(matches!(
            validate_heat_point_request(&coords),
            Ok(HeatPointSource::Coordinates { lat, lng, intensity: None }) if lat == 10.0 && lng == 20.0
        ));

        let out_of_range = HeatPointRequest { lat: Some(91.0), lng: Some(0.0), ..Default::default() };
        assert!(matches!(
            validate_heat_point_request(&out_of_range),
            Err(ValidationError::CoordinatesOutOfRange { .. })
        ));

        let location = HeatPointRequest { location_string: Some("  Lisbon ".into()), ..Default::default() };
        assert!(matches!(validate_heat_point_request(&location), Ok(HeatPointSource::Location(l)) if l == "Lisbon"));

        let empty = HeatPointRequest { location_string: Some("   ".into()), ..Default::default() };
        assert!(matches!(validate_heat_point_request(&empty), Err(ValidationError::MissingLocation)));
    }

    #[test]
    fn test_update_wire_format() {
        let update = VoteUpdate {
            kind: UpdateKind::NewCity,
            city: "Denver".into(),
            votes: 1,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["kind"], "new_city");
        assert_eq!(json["city"], "Denver");
        assert_eq!(json["votes"], 1);
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_vote_request_consent_defaults_false() {
        let req: VoteRequest = serde_json::from_str(r#"{"city":"Austin","email":"a@x.com"}"#).unwrap();
        assert!(!req.consent);
    }

    #[test]
    fn test_error_response_from_validation() {
        let body = ErrorResponse::from(ValidationError::CityWithoutLetter);
        assert_eq!(body.code, ErrorCode::ValidationFailed);
        assert!(body.error.contains("at least one letter"));
        assert_eq!(serde_json::to_value(&body).unwrap()["code"], "validationFailed");
    }

    #[test]
    fn test_fans_to_points() {
        let points = fans_to_points(&demo_fans());
        assert_eq!(points.len(), 4);
        assert_eq!(points[1].weight, 1.0);
        let la = (12_450.0f64 / 16_800.0).powf(0.7);
        assert!((points[0].weight - la).abs() < 1e-12);
        assert!(fans_to_points(&[]).is_empty());

        let zeros = fans_to_points(&[CityFan::new("Nowhere", 0.0, 0.0, 0.0), CityFan::new("Less", 1.0, 1.0, -5.0)]);
        assert!(zeros.iter().all(|p| p.weight == 0.0));
    }

    #[test]
    fn test_merge_fans() {
        let merged = merge_fans(&[
            CityFan::new("LA", 34.05221, -118.24369, 10.0),
            CityFan::new("NYC", 40.7128, -74.006, 5.0),
            CityFan::new("Los Angeles", 34.05219, -118.24371, 7.0),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "LA");
        assert_eq!(merged[0].fans, 17.0);
        assert_eq!(merged[1].fans, 5.0);
    }

    #[test]
    fn test_city_search() {
        assert!(search_cities("   ", DEFAULT_SEARCH_LIMIT).is_empty());
        assert_eq!(
            search_cities("san", DEFAULT_SEARCH_LIMIT),
            vec!["San Antonio", "San Diego", "San Francisco", "San Jose", "San Miguel de Tucumán", "Santiago"]
        );
        assert_eq!(search_cities("a", DEFAULT_SEARCH_LIMIT).len(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(search_cities("PORT", 3), vec!["Port Elizabeth", "Port Harcourt", "Port Said"]);
        assert_eq!(search_cities("denv", 10), vec!["Denver"]);
    }
}
