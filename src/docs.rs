use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::model::{AuthResponse, LoginRequest, RegisterRequestDto};
use crate::modules::categories::model::{
    Category, CategoryWithChildren, CreateCategoryDto, SubCategorySummary, UpdateCategoryDto,
};
use crate::modules::exchange_rates::model::{
    CreateExchangeRateDto, ExchangeRate, UpdateExchangeRateDto,
};
use crate::modules::orders::model::{CreateOrderDto, Order, OrderStatus, UpdateOrderDto};
use crate::modules::products::model::{
    CreateProductDto, EntityRef, Product, ProductDetail, ProductWithRefs, ProfitReport,
    UpdateProductDto,
};
use crate::modules::purchases::model::{
    CreatePurchaseDto, Purchase, PurchaseWithProduct, UpdatePurchaseDto,
};
use crate::modules::sales::model::{CreateSaleDto, Sale, SaleWithProduct, UpdateSaleDto};
use crate::modules::sub_categories::model::{
    CreateSubCategoryDto, SubCategory, SubCategoryWithContext, UpdateSubCategoryDto,
};
use crate::modules::users::model::{CreateUserDto, Role, UpdateUserDto, User};
use crate::utils::errors::ErrorBody;
use crate::utils::pagination::{PaginatedResponse, PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::categories::controller::get_categories,
        crate::modules::categories::controller::create_category,
        crate::modules::categories::controller::get_category,
        crate::modules::categories::controller::update_category,
        crate::modules::categories::controller::delete_category,
        crate::modules::sub_categories::controller::get_sub_categories,
        crate::modules::sub_categories::controller::create_sub_category,
        crate::modules::sub_categories::controller::get_sub_category,
        crate::modules::sub_categories::controller::update_sub_category,
        crate::modules::sub_categories::controller::delete_sub_category,
        crate::modules::products::controller::get_products,
        crate::modules::products::controller::create_product,
        crate::modules::products::controller::get_product,
        crate::modules::products::controller::update_product,
        crate::modules::products::controller::delete_product,
        crate::modules::products::controller::get_profit_report,
        crate::modules::purchases::controller::get_purchases,
        crate::modules::purchases::controller::create_purchase,
        crate::modules::purchases::controller::get_purchase,
        crate::modules::purchases::controller::update_purchase,
        crate::modules::purchases::controller::delete_purchase,
        crate::modules::sales::controller::get_sales,
        crate::modules::sales::controller::create_sale,
        crate::modules::sales::controller::get_sale,
        crate::modules::sales::controller::update_sale,
        crate::modules::sales::controller::delete_sale,
        crate::modules::exchange_rates::controller::get_exchange_rates,
        crate::modules::exchange_rates::controller::get_active_rate,
        crate::modules::exchange_rates::controller::create_exchange_rate,
        crate::modules::exchange_rates::controller::update_exchange_rate,
        crate::modules::exchange_rates::controller::delete_exchange_rate,
        crate::modules::orders::controller::get_orders,
        crate::modules::orders::controller::create_order,
        crate::modules::orders::controller::get_order,
        crate::modules::orders::controller::update_order,
        crate::modules::orders::controller::delete_order,
    ),
    components(
        schemas(
            User,
            Role,
            CreateUserDto,
            UpdateUserDto,
            RegisterRequestDto,
            LoginRequest,
            AuthResponse,
            Category,
            CategoryWithChildren,
            SubCategorySummary,
            CreateCategoryDto,
            UpdateCategoryDto,
            SubCategory,
            SubCategoryWithContext,
            CreateSubCategoryDto,
            UpdateSubCategoryDto,
            Product,
            ProductWithRefs,
            ProductDetail,
            ProfitReport,
            EntityRef,
            CreateProductDto,
            UpdateProductDto,
            Purchase,
            PurchaseWithProduct,
            CreatePurchaseDto,
            UpdatePurchaseDto,
            Sale,
            SaleWithProduct,
            CreateSaleDto,
            UpdateSaleDto,
            ExchangeRate,
            CreateExchangeRateDto,
            UpdateExchangeRateDto,
            Order,
            OrderStatus,
            CreateOrderDto,
            UpdateOrderDto,
            ErrorBody,
            PaginationMeta,
            PaginationParams,
            PaginatedResponse<ProductWithRefs>,
            PaginatedResponse<PurchaseWithProduct>,
            PaginatedResponse<SaleWithProduct>,
            PaginatedResponse<Order>,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, and current-user endpoints"),
        (name = "Users", description = "User administration (admin only)"),
        (name = "Categories", description = "Product category management"),
        (name = "Subcategories", description = "Product subcategory management"),
        (name = "Products", description = "Product catalog and profit reporting"),
        (name = "Purchases", description = "Stock purchases priced in RMB"),
        (name = "Sales", description = "Sales priced in MGA"),
        (name = "Exchange Rates", description = "RMB to MGA conversion rates"),
        (name = "Orders", description = "Procurement orders awaiting stock")
    ),
    info(
        title = "StockBay API",
        version = "0.1.0",
        description = "Inventory and procurement REST API built with Rust, Axum, and PostgreSQL featuring JWT-based authentication.",
        contact(
            name = "API Support",
            email = "support@stockbay.app"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
