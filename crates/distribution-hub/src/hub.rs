//! Wires every record service and the terms engine into one router.

use std::sync::Arc;

use axum::Router;

use crate::config::RecordsConfig;
use crate::lending::{
    product_import_router, Contract, LendingConfiguration, Product, Shipment,
};
use crate::partners::{payment_method_router, Agency, AgencyPaymentMethod, Agent, Distributor};
use crate::records::{
    crud_router, status_router, CrudService, InMemoryRepository, PageLimits, SharedRepository,
};
use crate::terms::{terms_router, RenewalPolicy, TermsDocument, TermsService, TermsTemplate};

/// Storage backing each managed entity.
#[derive(Clone)]
pub struct HubRepositories {
    pub distributors: SharedRepository<Distributor>,
    pub agencies: SharedRepository<Agency>,
    pub agents: SharedRepository<Agent>,
    pub payment_methods: SharedRepository<AgencyPaymentMethod>,
    pub products: SharedRepository<Product>,
    pub lending_configurations: SharedRepository<LendingConfiguration>,
    pub contracts: SharedRepository<Contract>,
    pub shipments: SharedRepository<Shipment>,
    pub templates: SharedRepository<TermsTemplate>,
    pub documents: SharedRepository<TermsDocument>,
}

impl HubRepositories {
    pub fn in_memory() -> Self {
        Self {
            distributors: Arc::new(InMemoryRepository::<Distributor>::default()),
            agencies: Arc::new(InMemoryRepository::<Agency>::default()),
            agents: Arc::new(InMemoryRepository::<Agent>::default()),
            payment_methods: Arc::new(InMemoryRepository::<AgencyPaymentMethod>::default()),
            products: Arc::new(InMemoryRepository::<Product>::default()),
            lending_configurations: Arc::new(
                InMemoryRepository::<LendingConfiguration>::default(),
            ),
            contracts: Arc::new(InMemoryRepository::<Contract>::default()),
            shipments: Arc::new(InMemoryRepository::<Shipment>::default()),
            templates: Arc::new(InMemoryRepository::<TermsTemplate>::default()),
            documents: Arc::new(InMemoryRepository::<TermsDocument>::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubSettings {
    pub limits: PageLimits,
    pub renewal: RenewalPolicy,
}

impl From<&RecordsConfig> for HubSettings {
    fn from(config: &RecordsConfig) -> Self {
        Self {
            limits: PageLimits {
                default_size: config.default_page_size as usize,
                max_size: config.max_page_size as usize,
            },
            renewal: RenewalPolicy::new(config.renewal_window_days),
        }
    }
}

pub struct Hub {
    pub distributors: Arc<CrudService<Distributor>>,
    pub agencies: Arc<CrudService<Agency>>,
    pub agents: Arc<CrudService<Agent>>,
    pub payment_methods: Arc<CrudService<AgencyPaymentMethod>>,
    pub products: Arc<CrudService<Product>>,
    pub lending_configurations: Arc<CrudService<LendingConfiguration>>,
    pub contracts: Arc<CrudService<Contract>>,
    pub shipments: Arc<CrudService<Shipment>>,
    pub terms: Arc<TermsService>,
}

impl Hub {
    pub fn new(repositories: HubRepositories, settings: HubSettings) -> Self {
        let limits = settings.limits;
        let distributors = Arc::new(CrudService::new(repositories.distributors, limits));
        let terms = TermsService::new(
            Arc::new(CrudService::new(repositories.templates, limits)),
            Arc::new(CrudService::new(repositories.documents, limits)),
            distributors.clone(),
            settings.renewal,
        );

        Self {
            distributors,
            agencies: Arc::new(CrudService::new(repositories.agencies, limits)),
            agents: Arc::new(CrudService::new(repositories.agents, limits)),
            payment_methods: Arc::new(CrudService::new(repositories.payment_methods, limits)),
            products: Arc::new(CrudService::new(repositories.products, limits)),
            lending_configurations: Arc::new(CrudService::new(
                repositories.lending_configurations,
                limits,
            )),
            contracts: Arc::new(CrudService::new(repositories.contracts, limits)),
            shipments: Arc::new(CrudService::new(repositories.shipments, limits)),
            terms: Arc::new(terms),
        }
    }

    pub fn in_memory(settings: HubSettings) -> Self {
        Self::new(HubRepositories::in_memory(), settings)
    }

    /// Every `/api/v1` route served by the hub.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(crud_router("/api/v1/distributors", self.distributors.clone()))
            .merge(crud_router("/api/v1/agencies", self.agencies.clone()))
            .merge(crud_router("/api/v1/agents", self.agents.clone()))
            .merge(crud_router(
                "/api/v1/agency-payment-methods",
                self.payment_methods.clone(),
            ))
            .merge(payment_method_router(self.payment_methods.clone()))
            .merge(crud_router("/api/v1/products", self.products.clone()))
            .merge(product_import_router(self.products.clone()))
            .merge(crud_router(
                "/api/v1/lending-configurations",
                self.lending_configurations.clone(),
            ))
            .merge(crud_router("/api/v1/contracts", self.contracts.clone()))
            .merge(status_router("/api/v1/contracts", self.contracts.clone()))
            .merge(crud_router("/api/v1/shipments", self.shipments.clone()))
            .merge(status_router("/api/v1/shipments", self.shipments.clone()))
            .merge(terms_router(self.terms.clone()))
    }
}
