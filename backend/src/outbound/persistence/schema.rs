//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! Diesel uses them for compile-time query validation and type-safe SQL
//! generation. `diesel print-schema` can regenerate them from a live
//! database after a migration changes the shape.

diesel::table! {
    /// Part manufacturer brands (Bosch, Febi, …).
    brands (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Unique URL slug.
        slug -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Optional logo image URL.
        logo_url -> Nullable<Varchar>,
        /// Optional country-of-origin label.
        country -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Two-level category tree: root sections and leaf categories.
    categories (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Unique URL slug.
        slug -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Parent section; NULL for roots.
        parent_id -> Nullable<Uuid>,
        /// Ordering weight within the parent.
        position -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Purchasable parts.
    products (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Unique URL slug.
        slug -> Varchar,
        /// Unique shop SKU.
        sku -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Long-form description.
        description -> Text,
        /// Manufacturer brand.
        brand_id -> Uuid,
        /// Leaf category.
        category_id -> Uuid,
        /// Sale price in stotinki.
        price_minor -> Int8,
        /// Optional struck-through price in stotinki.
        compare_at_minor -> Nullable<Int8>,
        /// Units on hand; CHECK (stock >= 0).
        stock -> Int4,
        /// Gallery image URLs.
        image_urls -> Array<Text>,
        /// Manufacturer OEM cross-reference numbers, uppercase.
        oem_refs -> Array<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vehicle makes.
    vehicle_brands (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Unique URL slug.
        slug -> Varchar,
        /// Display name.
        name -> Varchar,
    }
}

diesel::table! {
    /// Model generations within a make.
    vehicle_models (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Owning make.
        vehicle_brand_id -> Uuid,
        /// URL slug, unique within the make.
        slug -> Varchar,
        /// Display name.
        name -> Varchar,
        /// First production year.
        year_from -> Int4,
        /// Last production year; NULL while in production.
        year_to -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Engines fitted to a model; the leaf of the fitment chain.
    vehicle_engines (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Owning model.
        model_id -> Uuid,
        /// Manufacturer engine code.
        code -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Fuel type label (`petrol`, `diesel`, `lpg`, `hybrid`, `electric`).
        fuel -> Varchar,
        /// Rated power in kW.
        power_kw -> Int4,
        /// First production year.
        year_from -> Int4,
        /// Last production year; NULL while in production.
        year_to -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Many-to-many product ↔ engine fitments.
    product_fitments (product_id, engine_id) {
        /// The fitting product.
        product_id -> Uuid,
        /// The engine it fits.
        engine_id -> Uuid,
    }
}

diesel::table! {
    /// Registered customer accounts.
    customers (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Unique lowercased login email.
        email -> Varchar,
        /// Display name.
        display_name -> Varchar,
        /// Argon2id password hash in PHC string format.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Placed orders.
    orders (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Unique human-facing reference.
        reference -> Varchar,
        /// Owning account; NULL for guest checkout.
        customer_id -> Nullable<Uuid>,
        /// Contact email.
        email -> Varchar,
        /// Recipient full name.
        recipient -> Varchar,
        /// Contact phone.
        phone -> Varchar,
        /// Delivery city.
        city -> Varchar,
        /// Delivery postal code.
        postcode -> Varchar,
        /// Delivery street address or courier office.
        address_line -> Varchar,
        /// Optional courier note.
        note -> Nullable<Varchar>,
        /// Sum of line totals in stotinki.
        subtotal_minor -> Int8,
        /// Delivery fee in stotinki.
        delivery_minor -> Int8,
        /// Grand total in stotinki.
        total_minor -> Int8,
        /// Lifecycle state label.
        status -> Varchar,
        /// Hosted payment session id, once created.
        payment_session_id -> Nullable<Varchar>,
        /// Placement timestamp.
        created_at -> Timestamptz,
        /// Last state change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Order lines with their catalog snapshot.
    order_items (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Owning order.
        order_id -> Uuid,
        /// Purchased product.
        product_id -> Uuid,
        /// SKU at checkout time.
        sku -> Varchar,
        /// Display name at checkout time.
        name -> Varchar,
        /// Unit price at checkout time, in stotinki.
        unit_price_minor -> Int8,
        /// Units purchased.
        quantity -> Int4,
    }
}

diesel::joinable!(products -> brands (brand_id));
diesel::joinable!(products -> categories (category_id));
diesel::joinable!(vehicle_models -> vehicle_brands (vehicle_brand_id));
diesel::joinable!(vehicle_engines -> vehicle_models (model_id));
diesel::joinable!(product_fitments -> products (product_id));
diesel::joinable!(product_fitments -> vehicle_engines (engine_id));
diesel::joinable!(orders -> customers (customer_id));
diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_items -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    brands,
    categories,
    products,
    vehicle_brands,
    vehicle_models,
    vehicle_engines,
    product_fitments,
    customers,
    orders,
    order_items,
);
