//! Reference values kept in code rather than in tables.

/// Colombian health-insurance administrators, `(code, display name)`.
pub const EPS_LIST: [(&str, &str); 17] = [
    ("NUEVA EPS", "Nueva EPS"),
    ("SURA EPS", "EPS Sura"),
    ("SANITAS EPS", "EPS Sanitas"),
    ("COMPENSAR EPS", "Compensar EPS"),
    ("FAMISANAR EPS", "Famisanar EPS"),
    ("SALUD TOTAL EPS", "Salud Total EPS"),
    ("COOSALUD EPS", "Coosalud EPS"),
    ("MUTUAL SER EPS", "Mutual Ser EPS"),
    ("ALIANSALUD EPS", "Aliansalud EPS"),
    ("COMFENALCO VALLE EPS", "Comfenalco Valle EPS"),
    ("EMSSANAR EPS", "Emssanar EPS"),
    ("ASMET SALUD EPS", "Asmet Salud EPS"),
    ("MALLAMAS EPS", "Mallamas EPS"),
    ("PIJAOS SALUD EPS", "Pijaos Salud EPS"),
    ("CAPITAL SALUD EPS", "Capital Salud EPS"),
    ("SAVIA SALUD EPS", "Savia Salud EPS"),
    ("MEDIMAS EPS", "Medimás EPS"),
];

/// Medical specialties, `(code, display name)`.
pub const SPECIALTIES: [(&str, &str); 16] = [
    ("medicina_general", "Medicina General"),
    ("pediatria", "Pediatría"),
    ("ginecologia", "Ginecología y Obstetricia"),
    ("cardiologia", "Cardiología"),
    ("dermatologia", "Dermatología"),
    ("neurologia", "Neurología"),
    ("ortopedia", "Ortopedia y Traumatología"),
    ("oftalmologia", "Oftalmología"),
    ("otorrinolaringologia", "Otorrinolaringología"),
    ("psiquiatria", "Psiquiatría"),
    ("medicina_interna", "Medicina Interna"),
    ("endocrinologia", "Endocrinología"),
    ("gastroenterologia", "Gastroenterología"),
    ("urologia", "Urología"),
    ("neumologia", "Neumología"),
    ("odontologia", "Odontología"),
];

pub const UNKNOWN_SPECIALTY: &str = "Unknown specialty";

pub fn specialty_name(code: &str) -> Option<&'static str> {
    SPECIALTIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn specialty_name_or_unknown(code: &str) -> &'static str {
    specialty_name(code).unwrap_or(UNKNOWN_SPECIALTY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_specialty_resolves_to_display_name() {
        assert_eq!(specialty_name("cardiologia"), Some("Cardiología"));
    }

    #[test]
    fn unknown_specialty_falls_back() {
        assert_eq!(specialty_name("astrologia"), None);
        assert_eq!(specialty_name_or_unknown("astrologia"), UNKNOWN_SPECIALTY);
    }

    #[test]
    fn eps_codes_are_unique() {
        for (i, (code, _)) in EPS_LIST.iter().enumerate() {
            assert!(EPS_LIST[i + 1..].iter().all(|(other, _)| other != code));
        }
    }
}
