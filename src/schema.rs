table! {
    account_logins (token, account_id, login_time) {
        token -> Char,
        account_id -> Unsigned<Bigint>,
        login_time -> Datetime,
    }
}

table! {
    accounts (id) {
        id -> Unsigned<Bigint>,
        first_name -> Varchar,
        last_name -> Nullable<Varchar>,
        email -> Varchar,
        password -> Char,
        phone -> Nullable<Varchar>,
        address -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        document_type -> Nullable<Varchar>,
        document_number -> Nullable<Varchar>,
        registered_at -> Datetime,
        photo -> Nullable<Varchar>,
    }
}

table! {
    appointments (id) {
        id -> Unsigned<Bigint>,
        patient_id -> Unsigned<Bigint>,
        doctor_id -> Unsigned<Bigint>,
        date -> Date,
        time -> Time,
        duration -> Integer,
        kind -> Varchar,
        reason -> Varchar,
        status -> Varchar,
        notes -> Nullable<Varchar>,
    }
}

table! {
    cie10 (id) {
        id -> Unsigned<Bigint>,
        code -> Varchar,
        description -> Varchar,
        chapter -> Nullable<Varchar>,
        group_name -> Nullable<Varchar>,
        active -> Bool,
        updated_at -> Datetime,
    }
}

table! {
    cities (id) {
        id -> Unsigned<Bigint>,
        name -> Varchar,
        department_id -> Unsigned<Bigint>,
    }
}

table! {
    clinic_settings (id) {
        id -> Unsigned<Bigint>,
        account_id -> Unsigned<Bigint>,
        company_name -> Varchar,
        company_nit -> Varchar,
        health_registry -> Varchar,
        slogan -> Nullable<Varchar>,
        logo -> Nullable<Varchar>,
        favicon -> Nullable<Varchar>,
        updated_at -> Datetime,
    }
}

table! {
    departments (id) {
        id -> Unsigned<Bigint>,
        name -> Varchar,
    }
}

table! {
    doctors (id) {
        id -> Unsigned<Bigint>,
        first_name -> Varchar,
        last_name -> Varchar,
        document_type -> Varchar,
        document_number -> Varchar,
        birth_date -> Date,
        gender -> Varchar,
        phone -> Varchar,
        email -> Varchar,
        address -> Varchar,
        department_id -> Unsigned<Bigint>,
        city_id -> Unsigned<Bigint>,
        university_id -> Unsigned<Bigint>,
        years_experience -> Integer,
        specialty -> Varchar,
        registry_number -> Varchar,
        status -> Varchar,
        registered_at -> Datetime,
        updated_at -> Datetime,
    }
}

table! {
    histories (id) {
        id -> Unsigned<Bigint>,
        appointment_id -> Unsigned<Bigint>,
        recorded_at -> Datetime,
        reason -> Varchar,
        background -> Nullable<Varchar>,
        treatment -> Nullable<Varchar>,
    }
}

table! {
    history_diagnoses (history_id, cie10_id) {
        history_id -> Unsigned<Bigint>,
        cie10_id -> Unsigned<Bigint>,
        kind -> Nullable<Varchar>,
    }
}

table! {
    invoices (id) {
        id -> Unsigned<Bigint>,
        appointment_id -> Unsigned<Bigint>,
        service -> Varchar,
        amount -> Double,
        status -> Varchar,
        issued_at -> Datetime,
        due_date -> Date,
        payment_method -> Varchar,
        kind -> Varchar,
        notes -> Nullable<Text>,
    }
}

table! {
    patients (id) {
        id -> Unsigned<Bigint>,
        first_name -> Varchar,
        last_name -> Varchar,
        document_type -> Varchar,
        document_number -> Varchar,
        birth_date -> Date,
        sex -> Char,
        blood_type -> Nullable<Varchar>,
        regime -> Nullable<Varchar>,
        department_id -> Unsigned<Bigint>,
        city_id -> Unsigned<Bigint>,
        phone -> Varchar,
        email -> Varchar,
        address -> Varchar,
        marital_status -> Varchar,
        occupation -> Varchar,
        eps -> Varchar,
        emergency_contact -> Varchar,
        emergency_phone -> Varchar,
    }
}

table! {
    services (id) {
        id -> Unsigned<Bigint>,
        name -> Varchar,
        specialty -> Nullable<Varchar>,
        price -> Double,
        active -> Bool,
    }
}

table! {
    universities (id) {
        id -> Unsigned<Bigint>,
        name -> Varchar,
        acronym -> Nullable<Varchar>,
        department -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        kind -> Nullable<Varchar>,
        status -> Varchar,
    }
}

allow_tables_to_appear_in_same_query!(
    account_logins,
    accounts,
    appointments,
    cie10,
    cities,
    clinic_settings,
    departments,
    doctors,
    histories,
    history_diagnoses,
    invoices,
    patients,
    services,
    universities,
);
